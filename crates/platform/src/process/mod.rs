//! Process execution operations

use modenv_errors::PlatformError;
use std::path::PathBuf;
use std::process::ExitStatus;

use crate::env::VarMap;

/// Platform-specific command builder
#[derive(Debug, Clone)]
pub struct PlatformCommand {
    program: String,
    args: Vec<String>,
    env: Option<VarMap>,
}

impl PlatformCommand {
    /// Create a new platform command
    #[must_use]
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            env: None,
        }
    }

    /// Add an argument to the command
    pub fn arg<S: AsRef<str>>(&mut self, arg: S) -> &mut Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    /// Add multiple arguments to the command
    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.args.push(arg.as_ref().to_string());
        }
        self
    }

    /// Run the command with exactly this environment instead of inheriting
    /// the parent's
    pub fn env_exact(&mut self, vars: VarMap) -> &mut Self {
        self.env = Some(vars);
        self
    }

    /// Get the program name
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Get the arguments
    #[must_use]
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get the exact environment, if one was set
    #[must_use]
    pub fn get_env(&self) -> Option<&VarMap> {
        self.env.as_ref()
    }

    /// Render the command line for diagnostics
    #[must_use]
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Output from command execution
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Stdout decoded lossily
    #[must_use]
    pub fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Stderr decoded lossily
    #[must_use]
    pub fn stderr_str(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Trait for process execution operations
pub trait ProcessOperations: Send + Sync {
    /// Execute a command to completion and return its output
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned.
    fn execute_command(&self, cmd: &PlatformCommand) -> Result<CommandOutput, PlatformError>;

    /// Find the path to an executable
    ///
    /// # Errors
    ///
    /// Returns `CommandNotFound` if the program is not on `PATH`.
    fn which(&self, program: &str) -> Result<PathBuf, PlatformError>;
}
