//! Platform-specific operation errors

use std::borrow::Cow;

use crate::{ModuleError, UserFacingError};
use thiserror::Error;

/// Errors that can occur during platform-specific operations
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    #[error("process execution failed: {command} - {message}")]
    ProcessExecutionFailed { command: String, message: String },

    #[error("command not found: {command}")]
    CommandNotFound { command: String },

    #[error("invalid environment variable name: {name}")]
    InvalidVariableName { name: String },
}

impl UserFacingError for PlatformError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::CommandNotFound { .. } => Some("Ensure the tool is installed and on PATH."),
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::ProcessExecutionFailed { .. } => "platform.process_execution_failed",
            Self::CommandNotFound { .. } => "platform.command_not_found",
            Self::InvalidVariableName { .. } => "platform.invalid_variable_name",
        };
        Some(code)
    }
}

impl From<PlatformError> for ModuleError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::CommandNotFound { command } => ModuleError::SystemUnavailable {
                system: command,
                message: "tool not found".to_string(),
            },
            PlatformError::ProcessExecutionFailed { command, message } => {
                ModuleError::CommandFailed { command, message }
            }
            PlatformError::InvalidVariableName { name } => ModuleError::UnparsableOutput {
                tool: "module".to_string(),
                line: name,
            },
        }
    }
}
