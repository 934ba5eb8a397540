//! Environments built from configuration

use modenv_config::{Config, EnvironmentConfig};
use modenv_errors::Error;
use modenv_types::EnvironmentKind;
use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::environment::Environment;
use crate::prog::{ProgEnvironment, Toolchain};
use crate::runtime::Runtime;
use crate::Activation;

/// An environment of whichever kind its configuration asked for
#[derive(Clone, PartialEq, Eq)]
pub enum ConfiguredEnvironment {
    Plain(Environment),
    Prog(ProgEnvironment),
}

impl ConfiguredEnvironment {
    /// Build the environment `name` described by `config`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the name or a variable name is
    /// invalid.
    pub fn from_config(name: &str, config: &EnvironmentConfig) -> Result<Self, Error> {
        let env = Environment::new(name, config.modules.iter().cloned(), config.variables.clone())?;

        Ok(match config.kind {
            EnvironmentKind::Environment => Self::Plain(env),
            EnvironmentKind::ProgEnvironment => {
                let defaults = Toolchain::default();
                let toolchain = Toolchain {
                    cc: config.cc.clone().unwrap_or(defaults.cc),
                    cxx: config.cxx.clone().or(defaults.cxx),
                    ftn: config.ftn.clone().or(defaults.ftn),
                    nvcc: config.nvcc.clone().unwrap_or(defaults.nvcc),
                    cppflags: config.cppflags.clone(),
                    cflags: config.cflags.clone(),
                    cxxflags: config.cxxflags.clone(),
                    fflags: config.fflags.clone(),
                    ldflags: config.ldflags.clone(),
                    include_search_path: config.include_search_path.clone(),
                    propagate: config.propagate,
                };
                Self::Prog(ProgEnvironment::with_toolchain(env, toolchain))
            }
        })
    }

    /// Look up `name` for `system` in `config` and build it
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownEnvironment` if no scope defines `name`,
    /// or a validation error from [`ConfiguredEnvironment::from_config`].
    pub fn resolve(config: &Config, name: &str, system: &str) -> Result<Self, Error> {
        Self::from_config(name, config.environment(name, system)?)
    }

    #[must_use]
    pub fn kind(&self) -> EnvironmentKind {
        match self {
            Self::Plain(_) => EnvironmentKind::Environment,
            Self::Prog(_) => EnvironmentKind::ProgEnvironment,
        }
    }

    /// Toolchain metadata, for programming environments
    #[must_use]
    pub fn as_prog(&self) -> Option<&ProgEnvironment> {
        match self {
            Self::Plain(_) => None,
            Self::Prog(prog) => Some(prog),
        }
    }
}

impl Deref for ConfiguredEnvironment {
    type Target = Environment;

    fn deref(&self) -> &Environment {
        match self {
            Self::Plain(env) => env,
            Self::Prog(prog) => prog.environment(),
        }
    }
}

impl DerefMut for ConfiguredEnvironment {
    fn deref_mut(&mut self) -> &mut Environment {
        match self {
            Self::Plain(env) => env,
            Self::Prog(prog) => &mut **prog,
        }
    }
}

impl fmt::Display for ConfiguredEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&**self, f)
    }
}

impl fmt::Debug for ConfiguredEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(env) => fmt::Debug::fmt(env, f),
            Self::Prog(prog) => fmt::Debug::fmt(prog, f),
        }
    }
}

impl Activation for ConfiguredEnvironment {
    fn name(&self) -> &str {
        Environment::name(self)
    }

    fn load(&mut self, rt: &Runtime) -> Result<(), Error> {
        Environment::load(self, rt)
    }

    fn unload(&mut self, rt: &Runtime) -> Result<(), Error> {
        Environment::unload(self, rt)
    }

    fn is_loaded(&self, rt: &Runtime) -> Result<bool, Error> {
        Environment::is_loaded(self, rt)
    }

    fn emit_load_commands(&self, rt: &Runtime) -> Vec<String> {
        Environment::emit_load_commands(self, rt)
    }
}
