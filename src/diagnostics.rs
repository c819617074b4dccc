//! Structured warnings returned by resolution, copy and merge routines.
//! Nothing in this module logs by itself; the caller decides how to render
//! collected diagnostics.

use std::fmt;
use std::path::{Path, PathBuf};

/// A recoverable condition observed while resolving or materializing a
/// template: a skipped ancestor, an aborted inheritance branch, a file
/// whose content could not be substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub path: Option<PathBuf>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self { path: None, message: message.into() }
    }

    pub fn with_path(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self { path: Some(path.as_ref().to_path_buf()), message: message.into() }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}", path.display(), self.message),
            None => write!(f, "{}", self.message),
        }
    }
}
