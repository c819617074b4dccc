//! Template inheritance resolution.
//! Expands `<inherit:NAME>` markers into an ordered, deepest-ancestor-first
//! list of copies, so that later copies can overwrite earlier ones
//! (precedence: descendant > ancestor > grand-ancestor).

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::diagnostics::Diagnostic;
use crate::error::{Error, Result};
use crate::lookup::TemplateLookup;

const MARKER_PREFIX: &str = "<inherit:";
const MARKER_SUFFIX: &str = ">";

/// One ancestor copy produced by resolution: materialize `from` into the
/// step destination, anchored at `anchor` relative to it. A marker nested
/// in a subdirectory anchors its ancestor's content at that subdirectory
/// rather than the template root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorCopy {
    pub from: PathBuf,
    pub anchor: PathBuf,
}

/// Result of resolving a template's ancestor chain. Warnings (missing
/// ancestors, aborted cycle branches) are returned to the caller instead
/// of being logged here.
#[derive(Debug, Default)]
pub struct Resolution {
    pub ancestors: Vec<AncestorCopy>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Extracts NAME from an `<inherit:NAME>` file name.
pub fn parse_inherit_marker(file_name: &str) -> Option<&str> {
    file_name
        .strip_prefix(MARKER_PREFIX)
        .and_then(|rest| rest.strip_suffix(MARKER_SUFFIX))
        .filter(|name| !name.is_empty())
}

/// Resolves the ordered ancestor chain of `template_dir`.
///
/// A marker whose name cannot be resolved to an existing directory is
/// skipped with a diagnostic; the rest of the chain is unaffected.
/// Re-entering a template already present in the current chain aborts only
/// that branch, so a template may legitimately appear once per independent
/// branch but never infinitely within one chain.
pub fn resolve(template_dir: &Path, lookup: &dyn TemplateLookup) -> Result<Resolution> {
    if !template_dir.exists() {
        return Err(Error::SourceNotFound {
            template_dir: template_dir.display().to_string(),
        });
    }

    let mut resolution = Resolution::default();
    let mut visited = HashSet::new();
    visited.insert(chain_key(template_dir));
    resolve_into(template_dir, PathBuf::new(), &visited, lookup, &mut resolution)?;
    Ok(resolution)
}

/// Canonical form used for cycle detection within one resolution chain.
fn chain_key(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn resolve_into(
    dir: &Path,
    anchor: PathBuf,
    visited: &HashSet<PathBuf>,
    lookup: &dyn TemplateLookup,
    resolution: &mut Resolution,
) -> Result<()> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| Error::file_system(dir, e))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| Error::file_system(dir, e))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if let Some(name) = parse_inherit_marker(&file_name) {
            let Some(ancestor) = lookup.lookup(name).filter(|path| path.exists()) else {
                resolution.diagnostics.push(Diagnostic::with_path(
                    dir,
                    format!("unknown ancestor template '{name}', marker skipped"),
                ));
                continue;
            };
            let key = chain_key(&ancestor);
            if visited.contains(&key) {
                resolution.diagnostics.push(Diagnostic::with_path(
                    &ancestor,
                    format!("inheritance cycle through '{name}', branch aborted"),
                ));
                continue;
            }
            // The visited set is copied per branch: sibling branches may
            // reuse an ancestor, one chain may not re-enter it.
            let mut branch = visited.clone();
            branch.insert(key);
            resolve_into(&ancestor, anchor.clone(), &branch, lookup, resolution)?;
            resolution.ancestors.push(AncestorCopy { from: ancestor, anchor: anchor.clone() });
        } else if entry.path().is_dir() {
            resolve_into(&entry.path(), anchor.join(&file_name), visited, lookup, resolution)?;
        }
    }
    Ok(())
}
