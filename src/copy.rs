//! Template materialization.
//! Copies one template directory into a target directory, applying skip
//! globs, renames, placeholder substitution and package descriptor rules.
//! Owns no state across calls; each invocation is independent.

use globset::{Glob, GlobSet, GlobSetBuilder};
use indexmap::IndexMap;
use log::debug;
use std::fs;
use std::path::Path;

use crate::binary::is_binary;
use crate::constants::{ALWAYS_SKIPPED_DIRS, PACKAGE_DESCRIPTOR};
use crate::diagnostics::Diagnostic;
use crate::error::{Error, Result};
use crate::inherit::parse_inherit_marker;
use crate::package;
use crate::step::VersionSpec;
use crate::substitute::{substitute, Variables};

/// Per-invocation copy policy.
pub struct CopyOptions<'a> {
    pub variables: &'a Variables,
    /// Entry names (glob patterns) excluded from the copy, on top of the
    /// implicit skip set.
    pub skip_files: &'a [String],
    /// File renames applied instead of name substitution, on top of the
    /// default rename table.
    pub rename_files: &'a IndexMap<String, String>,
    pub merge_package_json: bool,
    pub version: Option<&'a VersionSpec>,
    pub package_name: Option<&'a str>,
}

/// Materializes the template at `from` into `to`, creating `to` and any
/// parents as needed.
///
/// Inheritance markers and build-artifact directories are never copied.
/// A substitution failure on one file is reported as a diagnostic and does
/// not abort the remaining files.
pub fn materialize(from: &Path, to: &Path, options: &CopyOptions) -> Result<Vec<Diagnostic>> {
    if !from.exists() {
        return Err(Error::SourceNotFound { template_dir: from.display().to_string() });
    }

    let skip = build_skip_set(options.skip_files)?;
    let renames = effective_renames(options.rename_files);
    let mut diagnostics = Vec::new();
    copy_tree(from, to, options, &skip, &renames, &mut diagnostics)?;
    Ok(diagnostics)
}

/// Compiles the implicit skip set union the caller-supplied entries.
fn build_skip_set(skip_files: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    let patterns = ALWAYS_SKIPPED_DIRS
        .iter()
        .copied()
        .chain(skip_files.iter().map(String::as_str));
    for pattern in patterns {
        builder.add(Glob::new(pattern).map_err(|e| {
            Error::Configuration(format!("invalid skip pattern '{pattern}': {e}"))
        })?);
    }
    builder
        .build()
        .map_err(|e| Error::Configuration(format!("skip patterns failed to compile: {e}")))
}

/// Default rename table overridden by the caller's entries.
fn effective_renames(rename_files: &IndexMap<String, String>) -> IndexMap<String, String> {
    let mut renames = IndexMap::new();
    renames.insert("gitignore".to_string(), ".gitignore".to_string());
    for (source, target) in rename_files {
        renames.insert(source.clone(), target.clone());
    }
    renames
}

fn copy_tree(
    from: &Path,
    to: &Path,
    options: &CopyOptions,
    skip: &GlobSet,
    renames: &IndexMap<String, String>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<()> {
    fs::create_dir_all(to).map_err(|e| Error::file_system(to, e))?;

    let mut entries = fs::read_dir(from)
        .map_err(|e| Error::file_system(from, e))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| Error::file_system(from, e))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if parse_inherit_marker(&file_name).is_some() {
            // Composition metadata, not content.
            continue;
        }
        if skip.is_match(&file_name) {
            debug!("Skipping '{}'", entry.path().display());
            continue;
        }

        let source = entry.path();
        if source.is_dir() {
            let dest = to.join(substitute(&file_name, options.variables));
            copy_tree(&source, &dest, options, skip, renames, diagnostics)?;
        } else if file_name == PACKAGE_DESCRIPTOR {
            copy_descriptor(&source, &to.join(&file_name), options)?;
        } else {
            copy_file(&source, to, &file_name, options, renames, diagnostics)?;
        }
    }
    Ok(())
}

/// Package descriptors bypass substitution: they are either merged into an
/// existing descriptor or copied and patched.
fn copy_descriptor(source: &Path, dest: &Path, options: &CopyOptions) -> Result<()> {
    if options.merge_package_json && dest.exists() {
        debug!("Merging '{}' into '{}'", source.display(), dest.display());
        let existing = read_descriptor(dest)?;
        let incoming = read_descriptor(source)?;
        let merged = package::merge_descriptors(existing, incoming, dest)?;
        let text = package::to_pretty(&merged, dest)?;
        fs::write(dest, text).map_err(|e| Error::file_system(dest, e))
    } else {
        debug!("Copying '{}' -> '{}'", source.display(), dest.display());
        fs::copy(source, dest).map_err(|e| Error::file_system(dest, e))?;
        package::patch_descriptor(dest, options.version, options.package_name)
    }
}

fn copy_file(
    source: &Path,
    to: &Path,
    file_name: &str,
    options: &CopyOptions,
    renames: &IndexMap<String, String>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<()> {
    let dest_name = match renames.get(file_name) {
        Some(renamed) => renamed.clone(),
        None => substitute(file_name, options.variables),
    };
    let dest = to.join(dest_name);

    debug!("Copying '{}' -> '{}'", source.display(), dest.display());
    fs::copy(source, &dest).map_err(|e| Error::file_system(&dest, e))?;

    if is_binary(&dest) {
        return Ok(());
    }
    match fs::read_to_string(&dest) {
        Ok(content) => {
            let rendered = substitute(&content, options.variables);
            if rendered != content {
                fs::write(&dest, rendered).map_err(|e| Error::file_system(&dest, e))?;
            }
            Ok(())
        }
        Err(err) => {
            // Copied bytes stay in place; only the substitution is skipped.
            diagnostics.push(Diagnostic::with_path(
                &dest,
                format!("content substitution skipped: {err}"),
            ));
            Ok(())
        }
    }
}

fn read_descriptor(path: &Path) -> Result<serde_json::Value> {
    let text = fs::read_to_string(path).map_err(|e| Error::file_system(path, e))?;
    serde_json::from_str(&text).map_err(|e| Error::merge(path, e.to_string()))
}
