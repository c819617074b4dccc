//! Error handling for the strata crate.
//! Defines the error taxonomy and the result alias used throughout the crate.

use std::io;
use std::path::Path;
use thiserror::Error;

/// Custom error types for strata operations.
///
/// Every failure the pipeline surfaces to a caller is one of these variants.
/// Recoverable conditions (a single missing ancestor template, a
/// substitution failure on one file) never reach this type; they are
/// reported as diagnostics instead.
#[derive(Error, Debug)]
pub enum Error {
    /// A step was registered with neither a template source nor any hook,
    /// or caller-supplied input could not be understood.
    #[error("Configuration error: {0}.")]
    Configuration(String),

    /// The template directory a step copies from does not exist.
    #[error("Template source does not exist: '{template_dir}'.")]
    SourceNotFound { template_dir: String },

    /// The user declined to continue into a non-empty target directory.
    #[error("Cancelled by user.")]
    UserCancelled,

    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    Io(#[from] io::Error),

    /// File system failure with path context.
    #[error("File system error at '{path}': {source}.")]
    FileSystem { path: String, source: io::Error },

    /// A prepare command exited with a non-zero status.
    #[error("Prepare command exited with status {status}: '{command}'.")]
    PrepareCommand { command: String, status: i32 },

    /// A package descriptor was malformed during merge or patch.
    #[error("Package descriptor error in '{path}': {reason}.")]
    Merge { path: String, reason: String },

    /// Wraps a step failure with the index of the failing step.
    #[error("Step {index} failed: {source}")]
    Step {
        index: usize,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// File system failure carrying the offending path.
    pub fn file_system(path: &Path, source: io::Error) -> Self {
        Error::FileSystem { path: path.display().to_string(), source }
    }

    /// Malformed package descriptor at `path`.
    pub fn merge(path: &Path, reason: impl Into<String>) -> Self {
        Error::Merge { path: path.display().to_string(), reason: reason.into() }
    }
}

/// Convenience type alias for Results with strata's Error as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{}", err);
    std::process::exit(1);
}
