//! Template name lookup.
//! Maps the NAME of an `<inherit:NAME>` marker to a template directory.

use std::path::{Path, PathBuf};

/// Trait for resolving ancestor template names.
pub trait TemplateLookup {
    /// Resolves a template name to a directory, or `None` when the name
    /// is unknown.
    fn lookup(&self, name: &str) -> Option<PathBuf>;
}

/// Resolves template names against a single root directory: the template
/// `NAME` lives at `<root>/NAME`.
pub struct DirectoryLookup {
    root: PathBuf,
}

impl DirectoryLookup {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
}

impl TemplateLookup for DirectoryLookup {
    fn lookup(&self, name: &str) -> Option<PathBuf> {
        let candidate = self.root.join(name);
        candidate.is_dir().then_some(candidate)
    }
}
