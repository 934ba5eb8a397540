//! Native process operations implementation
//!
//! Runs commands synchronously with `std::process`; module tools are short
//! lived and the environment engine never suspends.

use modenv_errors::PlatformError;
use std::path::PathBuf;
use std::process::Command;
use std::time::Instant;
use tracing::debug;

use crate::process::{CommandOutput, PlatformCommand, ProcessOperations};

/// Process operations backed by the host OS
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeProcessOperations;

impl NativeProcessOperations {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ProcessOperations for NativeProcessOperations {
    fn execute_command(&self, cmd: &PlatformCommand) -> Result<CommandOutput, PlatformError> {
        let start = Instant::now();

        let mut command = Command::new(cmd.program());
        command.args(cmd.get_args());

        if let Some(vars) = cmd.get_env() {
            command.env_clear();
            command.envs(vars);
        }

        let output = command
            .output()
            .map_err(|e| PlatformError::ProcessExecutionFailed {
                command: cmd.display(),
                message: e.to_string(),
            })?;

        debug!(
            command = %cmd.display(),
            exit_code = ?output.status.code(),
            elapsed_ms = start.elapsed().as_millis(),
            "command finished"
        );

        Ok(CommandOutput {
            status: output.status,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    fn which(&self, program: &str) -> Result<PathBuf, PlatformError> {
        which::which(program).map_err(|_| PlatformError::CommandNotFound {
            command: program.to_string(),
        })
    }
}
