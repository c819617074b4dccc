//! Step pipeline orchestration.
//! Validates registered steps, runs the one-time target emptiness check,
//! expands template inheritance, materializes each step, executes
//! hook-injected steps and post-copy prepare commands.
//!
//! Execution is entirely single-threaded and sequential. Failure semantics
//! are fail-fast with no rollback: already-materialized files stay.

use indexmap::IndexMap;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::constants::PREPARE_COMMAND_FILE;
use crate::copy::{materialize, CopyOptions};
use crate::diagnostics::Diagnostic;
use crate::error::{Error, Result};
use crate::inherit;
use crate::lookup::TemplateLookup;
use crate::prompt::Prompter;
use crate::shell::ShellExecutor;
use crate::step::{BuildConfig, HookOutcome, Step, StepSpec};
use crate::substitute::{substitute, Variables};

/// A named unit of work an external sequential runner can execute and
/// report on, with per-step timing and caller-flagged crucial paths.
pub trait WorkUnit {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// Output paths the caller flagged as worth surfacing to the user.
    fn crucial_paths(&self) -> &[PathBuf];
    fn execute(&mut self) -> Result<()>;
}

/// Owns the ordered step list exclusively and drives it to completion.
pub struct Pipeline<'a> {
    name: String,
    description: String,
    config: BuildConfig,
    steps: Vec<Step>,
    lookup: &'a dyn TemplateLookup,
    prompter: &'a dyn Prompter,
    shell: &'a dyn ShellExecutor,
    crucial: Vec<PathBuf>,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        config: BuildConfig,
        lookup: &'a dyn TemplateLookup,
        prompter: &'a dyn Prompter,
        shell: &'a dyn ShellExecutor,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            config,
            steps: Vec::new(),
            lookup,
            prompter,
            shell,
            crucial: Vec::new(),
        }
    }

    /// Registers a step. A step must copy from a template or carry at
    /// least one hook; anything else is rejected here, before `build`.
    pub fn add_step(&mut self, step: Step) -> Result<()> {
        if step.spec.from.is_none() && !step.has_hooks() {
            return Err(Error::Configuration(
                "step has neither a template source nor any hook".to_string(),
            ));
        }
        self.steps.push(step);
        Ok(())
    }

    /// Flags an output path as crucial for the external runner's report.
    pub fn mark_crucial<P: Into<PathBuf>>(&mut self, path: P) {
        self.crucial.push(path.into());
    }

    /// Runs all registered steps in order. The first unrecovered error
    /// aborts the remaining steps; already-materialized files stay.
    pub fn build(&mut self) -> Result<()> {
        let steps = std::mem::take(&mut self.steps);

        if let Some(first) = steps.first() {
            self.check_target_empty(&first.spec)?;
        }

        for (index, step) in steps.iter().enumerate() {
            debug!("Running step {index}");
            self.run_step(step, true)
                .map_err(|source| Error::Step { index, source: Box::new(source) })?;
        }
        Ok(())
    }

    /// One-time check before the first step: continuing into a non-empty
    /// target requires the overwrite flag or an explicit user decision.
    fn check_target_empty(&self, spec: &StepSpec) -> Result<()> {
        let enabled = spec.check_empty.or(self.config.check_empty).unwrap_or(true);
        if !enabled || !target_has_entries(&self.config.target_dir)? {
            return Ok(());
        }
        let overwrite = spec.overwrite.unwrap_or(self.config.overwrite);
        let proceed = self.prompter.confirm(
            overwrite,
            format!(
                "Directory '{}' is not empty. Continue?",
                self.config.target_dir.display()
            ),
        )?;
        if proceed {
            Ok(())
        } else {
            Err(Error::UserCancelled)
        }
    }

    fn run_step(&self, step: &Step, allow_injected: bool) -> Result<()> {
        if let Some(hook) = &step.pre_hook {
            self.run_injected(hook(&self.config, &step.spec)?, allow_injected)?;
        }

        if let Some(from) = &step.spec.from {
            let variables = step.resolve_variables();
            self.copy_step(from, &step.spec, &variables)?;
        }

        if let Some(hook) = &step.post_hook {
            self.run_injected(hook(&self.config, &step.spec)?, allow_injected)?;
        }
        Ok(())
    }

    /// Hook-injected steps run immediately and exactly one level deep:
    /// their own hooks are invoked, but further injections are dropped.
    fn run_injected(&self, outcome: HookOutcome, allow_injected: bool) -> Result<()> {
        let HookOutcome::AdditionalSteps(injected) = outcome else {
            return Ok(());
        };
        if !allow_injected {
            warn!("Dropping steps injected below an already injected step");
            return Ok(());
        }
        for step in &injected {
            self.run_step(step, false)?;
        }
        Ok(())
    }

    /// Materializes one step: ancestors first (deepest ancestor first, so
    /// later copies win), then the step's own template, then any prepare
    /// commands found in the destination subtree.
    fn copy_step(&self, from: &Path, spec: &StepSpec, variables: &Variables) -> Result<()> {
        let dest_root = match &spec.to {
            Some(to) => self.config.target_dir.join(to),
            None => self.config.target_dir.clone(),
        };
        let version = spec.version.as_ref().or(self.config.version.as_ref());
        let package_name =
            spec.package_name.as_deref().or(self.config.package_name.as_deref());

        let resolution = inherit::resolve(from, self.lookup)?;
        render_diagnostics(&resolution.diagnostics);

        // Resolved ancestor entries carry only {from, anchor, variables};
        // skip lists, renames and the merge flag belong to the step's own
        // copy.
        let no_skips: Vec<String> = Vec::new();
        let no_renames: IndexMap<String, String> = IndexMap::new();
        for ancestor in &resolution.ancestors {
            let diagnostics = materialize(
                &ancestor.from,
                &dest_root.join(&ancestor.anchor),
                &CopyOptions {
                    variables,
                    skip_files: &no_skips,
                    rename_files: &no_renames,
                    merge_package_json: false,
                    version,
                    package_name,
                },
            )?;
            render_diagnostics(&diagnostics);
        }

        let diagnostics = materialize(
            from,
            &dest_root,
            &CopyOptions {
                variables,
                skip_files: &spec.skip_files,
                rename_files: &spec.rename_files,
                merge_package_json: spec.merge_package_json,
                version,
                package_name,
            },
        )?;
        render_diagnostics(&diagnostics);

        self.run_prepare_commands(&dest_root, variables)
    }

    /// Executes and removes every prepare-command marker under `root`.
    /// A non-zero exit aborts the whole pipeline.
    fn run_prepare_commands(&self, root: &Path, variables: &Variables) -> Result<()> {
        let mut markers = Vec::new();
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|e| Error::Io(e.into()))?;
            if entry.file_type().is_file()
                && entry.file_name().to_str() == Some(PREPARE_COMMAND_FILE)
            {
                markers.push(entry.path().to_path_buf());
            }
        }

        for marker in markers {
            let raw = fs::read_to_string(&marker).map_err(|e| Error::file_system(&marker, e))?;
            let command = substitute(raw.trim(), variables);
            let cwd = marker.parent().unwrap_or(root);
            debug!("Running prepare command '{}' in '{}'", command, cwd.display());
            let status = self.shell.run(&command, cwd)?;
            if status != 0 {
                return Err(Error::PrepareCommand { command, status });
            }
            fs::remove_file(&marker).map_err(|e| Error::file_system(&marker, e))?;
        }
        Ok(())
    }
}

impl WorkUnit for Pipeline<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn crucial_paths(&self) -> &[PathBuf] {
        &self.crucial
    }

    fn execute(&mut self) -> Result<()> {
        self.build()
    }
}

fn target_has_entries(target: &Path) -> Result<bool> {
    if !target.exists() {
        return Ok(false);
    }
    let mut entries = fs::read_dir(target).map_err(|e| Error::file_system(target, e))?;
    Ok(entries.next().is_some())
}

fn render_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        warn!("{diagnostic}");
    }
}
