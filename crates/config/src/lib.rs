#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for modenv
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/modenv/config.toml)
//! - Environment variables
//!
//! Environment definitions are grouped by scope: a system name or `"*"` for
//! definitions that apply everywhere. Tables keep their file order so
//! variables are exported in the order they were written.

use indexmap::IndexMap;
use modenv_errors::{ConfigError, Error};
use modenv_types::{EnvironmentKind, ModuleSystemKind, OutputFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Scope whose environments apply to every system
pub const ANY_SYSTEM: &str = "*";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub modules: ModulesConfig,

    /// scope -> environment name -> definition
    #[serde(default)]
    pub environments: IndexMap<String, IndexMap<String, EnvironmentConfig>>,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// System name used to pick the environment scope
    #[serde(default = "default_system")]
    pub system: String,
    #[serde(default)]
    pub default_output: OutputFormat,
}

/// Module system configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct ModulesConfig {
    #[serde(default)]
    pub system: ModuleSystemKind,
}

/// A single environment definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    #[serde(rename = "type", default)]
    pub kind: EnvironmentKind,
    #[serde(default)]
    pub modules: Vec<String>,
    #[serde(default)]
    pub variables: IndexMap<String, String>,

    // Toolchain metadata, only meaningful for ProgEnvironment
    pub cc: Option<String>,
    pub cxx: Option<String>,
    pub ftn: Option<String>,
    pub nvcc: Option<String>,
    pub cppflags: Option<String>,
    pub cflags: Option<String>,
    pub cxxflags: Option<String>,
    pub fflags: Option<String>,
    pub ldflags: Option<String>,
    #[serde(default)]
    pub include_search_path: Vec<String>,
    #[serde(default = "default_propagate")]
    pub propagate: bool,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            kind: EnvironmentKind::Environment,
            modules: Vec::new(),
            variables: IndexMap::new(),
            cc: None,
            cxx: None,
            ftn: None,
            nvcc: None,
            cppflags: None,
            cflags: None,
            cxxflags: None,
            fflags: None,
            ldflags: None,
            include_search_path: Vec::new(),
            propagate: true,
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            system: default_system(),
            default_output: OutputFormat::Plain,
        }
    }
}

fn default_system() -> String {
    "generic".to_string()
}

fn default_propagate() -> bool {
    true
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("modenv").join("config.toml"))
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or does not match the
    /// configuration schema.
    pub fn from_toml(contents: &str) -> Result<Self, Error> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        debug!(path = %path.display(), "loading configuration");
        Self::from_toml(&contents)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            debug!(path = %config_path.display(), "no configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// If path is provided, loads from that file.
    /// If path is None, uses the default loading behavior.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // MODENV_SYSTEM
        if let Ok(system) = std::env::var("MODENV_SYSTEM") {
            if system.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "MODENV_SYSTEM".to_string(),
                    value: system,
                }
                .into());
            }
            self.general.system = system;
        }

        // MODENV_MODULES_SYSTEM
        if let Ok(kind) = std::env::var("MODENV_MODULES_SYSTEM") {
            self.modules.system = kind
                .parse()
                .map_err(|name| ConfigError::UnknownModuleSystem { name })?;
        }

        Ok(())
    }

    /// Scopes searched for `system`, most specific first
    fn scopes(&self, system: &str) -> Vec<&IndexMap<String, EnvironmentConfig>> {
        let fallback = (system != ANY_SYSTEM).then_some(ANY_SYSTEM);
        std::iter::once(system)
            .chain(fallback)
            .filter_map(|scope| self.environments.get(scope))
            .collect()
    }

    /// Find the definition of `name` for `system`, falling back to `"*"`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownEnvironment` if neither scope defines it.
    pub fn environment(&self, name: &str, system: &str) -> Result<&EnvironmentConfig, Error> {
        self.scopes(system)
            .into_iter()
            .find_map(|scope| scope.get(name))
            .ok_or_else(|| {
                ConfigError::UnknownEnvironment {
                    name: name.to_string(),
                    system: system.to_string(),
                }
                .into()
            })
    }

    /// Names of every environment visible to `system`, system scope first
    #[must_use]
    pub fn environment_names(&self, system: &str) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for scope in self.scopes(system) {
            for name in scope.keys() {
                if !names.contains(&name.as_str()) {
                    names.push(name.as_str());
                }
            }
        }
        names
    }

    /// The configured system name
    #[must_use]
    pub fn system(&self) -> &str {
        &self.general.system
    }
}
