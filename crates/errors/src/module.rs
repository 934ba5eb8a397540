//! Module system error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ModuleError {
    #[error("module not found: {name}")]
    NotFound { name: String },

    #[error("module {name} conflicts with loaded modules: {conflicts:?}")]
    Conflict { name: String, conflicts: Vec<String> },

    #[error("module command failed: {command}: {message}")]
    CommandFailed { command: String, message: String },

    #[error("could not parse {tool} output: {line}")]
    UnparsableOutput { tool: String, line: String },

    #[error("module system {system} is not available: {message}")]
    SystemUnavailable { system: String, message: String },
}

impl UserFacingError for ModuleError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => Some("Check `module avail` for the exact module name."),
            Self::SystemUnavailable { .. } => {
                Some("Check the [modules] system setting or select `nomod`.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::CommandFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::NotFound { .. } => "module.not_found",
            Self::Conflict { .. } => "module.conflict",
            Self::CommandFailed { .. } => "module.command_failed",
            Self::UnparsableOutput { .. } => "module.unparsable_output",
            Self::SystemUnavailable { .. } => "module.system_unavailable",
        };
        Some(code)
    }
}
