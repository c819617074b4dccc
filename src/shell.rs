//! Shell execution of prepare commands.

use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// Trait for running a prepare command in a working directory.
pub trait ShellExecutor {
    /// Runs `command` with `cwd` as working directory and returns its
    /// exit code. There is deliberately no timeout.
    fn run(&self, command: &str, cwd: &Path) -> Result<i32>;
}

/// Executor backed by the platform shell, with inherited stdio so command
/// output reaches the user directly.
pub struct SystemShell;

impl SystemShell {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemShell {
    fn default() -> Self {
        SystemShell::new()
    }
}

impl ShellExecutor for SystemShell {
    fn run(&self, command: &str, cwd: &Path) -> Result<i32> {
        let status = shell_command(command)
            .current_dir(cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(Error::Io)?;
        // A signal-terminated child has no code; report it as a failure.
        Ok(status.code().unwrap_or(-1))
    }
}

#[cfg(not(windows))]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}
