//! User decision handling.
//! The pipeline asks exactly one question: whether to continue into a
//! non-empty target directory.

use dialoguer::Confirm;

use crate::error::{Error, Result};

/// Trait for confirming a destructive continuation with the user.
pub trait Prompter {
    /// Asks the user to confirm. When `skip` is set the question is not
    /// shown and the answer is yes.
    fn confirm(&self, skip: bool, prompt: String) -> Result<bool>;
}

/// Prompter backed by dialoguer.
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        DialoguerPrompter::new()
    }
}

impl Prompter for DialoguerPrompter {
    fn confirm(&self, skip: bool, prompt: String) -> Result<bool> {
        if skip {
            return Ok(true);
        }
        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|e| Error::Configuration(e.to_string()))
    }
}
