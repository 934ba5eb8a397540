#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions shared across modenv crates

pub mod identifier;
pub mod module;

pub use identifier::is_valid_identifier;
pub use module::{ModuleOp, ModuleSystemKind};

use serde::{Deserialize, Serialize};

/// Which environment flavour a configuration entry describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnvironmentKind {
    /// Plain modules + variables
    #[default]
    Environment,
    /// Modules + variables + toolchain metadata
    ProgEnvironment,
}

impl std::fmt::Display for EnvironmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Environment => write!(f, "Environment"),
            Self::ProgEnvironment => write!(f, "ProgEnvironment"),
        }
    }
}

/// Output format for CLI rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human readable text
    #[default]
    Plain,
    /// Machine readable JSON
    Json,
}
