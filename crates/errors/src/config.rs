//! Configuration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: String },

    #[error("parse error: {message}")]
    ParseError { message: String },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("unknown environment '{name}' for system '{system}'")]
    UnknownEnvironment { name: String, system: String },

    #[error("unknown module system: {name}")]
    UnknownModuleSystem { name: String },
}

impl UserFacingError for ConfigError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => {
                Some("Provide a configuration file with --config or create ~/.config/modenv/config.toml.")
            }
            Self::InvalidValue { .. } | Self::ParseError { .. } => {
                Some("Fix the configuration value and retry the command.")
            }
            Self::UnknownEnvironment { .. } => {
                Some("Define the environment under [environments.\"*\"] or the system's scope.")
            }
            Self::UnknownModuleSystem { .. } => {
                Some("Use one of: nomod, tmod, lmod.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::NotFound { .. } => "config.not_found",
            Self::ParseError { .. } => "config.parse_error",
            Self::InvalidValue { .. } => "config.invalid_value",
            Self::UnknownEnvironment { .. } => "config.unknown_environment",
            Self::UnknownModuleSystem { .. } => "config.unknown_module_system",
        };
        Some(code)
    }
}
