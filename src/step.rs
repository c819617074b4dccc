//! Step, build configuration and hook data model.

use indexmap::IndexMap;
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::Result;
use crate::substitute::Variables;

/// Version rewrite policy applied to copied package descriptors.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum VersionSpec {
    /// A single version: literal `workspace:*` occurrences are rewritten
    /// to `^version` (or the raw version for pre-release versions).
    Exact(String),
    /// Per-dependency overrides applied exactly to matching entries under
    /// `dependencies` and `devDependencies`.
    Dependencies(IndexMap<String, String>),
}

/// Plain-data half of a step. Hooks and lazily computed variables live on
/// [`Step`]; everything here can be declared in JSON.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StepSpec {
    /// Template directory this step copies from.
    pub from: Option<PathBuf>,
    /// Destination of the copy, relative to the target directory.
    pub to: Option<PathBuf>,
    /// Entry names (glob patterns) excluded from the copy.
    pub skip_files: Vec<String>,
    /// File renames applied instead of name substitution.
    pub rename_files: IndexMap<String, String>,
    /// Merge an incoming package descriptor into an existing one instead
    /// of overwriting it.
    pub merge_package_json: bool,
    /// Per-step override of the one-time target emptiness check.
    pub check_empty: Option<bool>,
    /// Per-step override of the overwrite-without-asking flag.
    pub overwrite: Option<bool>,
    /// Per-step override of the version rewrite policy.
    pub version: Option<VersionSpec>,
    /// Per-step override of the generated package name.
    pub package_name: Option<String>,
}

/// Variables attached to a step: either a direct mapping or a producer
/// invoked once at execution time.
pub enum VarSource {
    Map(Variables),
    Lazy(Box<dyn Fn() -> Variables>),
}

/// What a hook asked the pipeline to do next. Explicit, so the
/// injected-step contract stays unambiguous and testable.
pub enum HookOutcome {
    NoAdditionalSteps,
    AdditionalSteps(Vec<Step>),
}

/// Hook callback: receives the build configuration and the spec of the
/// step it is attached to, and may inject further steps.
pub type Hook = Box<dyn Fn(&BuildConfig, &StepSpec) -> Result<HookOutcome>>;

/// A unit of pipeline work: an optional copy-from-template operation plus
/// optional pre/post hooks.
///
/// Invariant: a step must have `spec.from` or at least one hook. The
/// pipeline enforces this at registration, not execution.
#[derive(Default)]
pub struct Step {
    pub spec: StepSpec,
    pub variables: Option<VarSource>,
    pub pre_hook: Option<Hook>,
    pub post_hook: Option<Hook>,
}

impl Step {
    /// A copy step from a template directory.
    pub fn from_template<P: Into<PathBuf>>(from: P) -> Self {
        Self {
            spec: StepSpec { from: Some(from.into()), ..StepSpec::default() },
            ..Self::default()
        }
    }

    /// A step that only runs hooks.
    pub fn hooks_only(pre_hook: Option<Hook>, post_hook: Option<Hook>) -> Self {
        Self { pre_hook, post_hook, ..Self::default() }
    }

    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.variables = Some(VarSource::Map(variables));
        self
    }

    pub fn with_lazy_variables(mut self, producer: impl Fn() -> Variables + 'static) -> Self {
        self.variables = Some(VarSource::Lazy(Box::new(producer)));
        self
    }

    /// Resolves the step's variables. Called exactly once per step at
    /// execution time; the result is immutable for the rest of the step.
    pub fn resolve_variables(&self) -> Variables {
        match &self.variables {
            Some(VarSource::Map(map)) => map.clone(),
            Some(VarSource::Lazy(producer)) => producer(),
            None => Variables::new(),
        }
    }

    pub(crate) fn has_hooks(&self) -> bool {
        self.pre_hook.is_some() || self.post_hook.is_some()
    }
}

/// Global defaults a step may override.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Directory the pipeline materializes into.
    pub target_dir: PathBuf,
    /// Package name written into generated package descriptors.
    pub package_name: Option<String>,
    /// Version rewrite policy for generated package descriptors.
    pub version: Option<VersionSpec>,
    /// Continue into a non-empty target directory without asking.
    pub overwrite: bool,
    /// Whether the one-time target emptiness check runs at all.
    pub check_empty: Option<bool>,
}

impl BuildConfig {
    pub fn new<P: Into<PathBuf>>(target_dir: P) -> Self {
        Self { target_dir: target_dir.into(), ..Self::default() }
    }
}
