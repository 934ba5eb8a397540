//! Environment activation error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum EnvironmentError {
    #[error("environment {name} is already loaded")]
    AlreadyLoaded { name: String },

    #[error("unsupported operation on {name}: {operation}")]
    Unsupported { name: String, operation: String },

    #[error("runtime has not been initialized")]
    RuntimeNotInitialized,

    #[error("runtime is already initialized")]
    RuntimeAlreadyInitialized,

    #[error("failed to restore environment {name}: {message}")]
    RestoreFailed { name: String, message: String },
}

impl UserFacingError for EnvironmentError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::AlreadyLoaded { .. } => Some("Unload the environment before loading it again."),
            Self::RuntimeNotInitialized => {
                Some("Install a runtime with `runtime::init` before activating environments.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::AlreadyLoaded { .. } => "environment.already_loaded",
            Self::Unsupported { .. } => "environment.unsupported",
            Self::RuntimeNotInitialized => "environment.runtime_not_initialized",
            Self::RuntimeAlreadyInitialized => "environment.runtime_already_initialized",
            Self::RestoreFailed { .. } => "environment.restore_failed",
        };
        Some(code)
    }
}
