//! Programming environments
//!
//! A [`ProgEnvironment`] is an [`Environment`] that also carries toolchain
//! metadata: compiler commands, flags, an include search path and whether
//! flags are passed on to build invocations. The metadata plays no part in
//! activation or equality.

pub mod legacy;

use modenv_errors::Error;
use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::environment::Environment;
use crate::runtime::Runtime;
use crate::Activation;

pub use legacy::{Legacy, DEPRECATION_MESSAGE};

/// Toolchain metadata of a programming environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub cc: String,
    pub cxx: Option<String>,
    pub ftn: Option<String>,
    pub nvcc: String,
    pub cppflags: Option<String>,
    pub cflags: Option<String>,
    pub cxxflags: Option<String>,
    pub fflags: Option<String>,
    pub ldflags: Option<String>,
    pub include_search_path: Vec<String>,
    pub propagate: bool,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            cc: "cc".to_string(),
            cxx: Some("CC".to_string()),
            ftn: Some("ftn".to_string()),
            nvcc: "nvcc".to_string(),
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

/// Environment with toolchain metadata
#[derive(Clone)]
pub struct ProgEnvironment {
    env: Environment,
    toolchain: Toolchain,
}

impl ProgEnvironment {
    /// Create a programming environment with the default toolchain
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for invalid names, as
    /// [`Environment::new`] does.
    pub fn new<M, V, K, S>(name: &str, modules: M, variables: V) -> Result<Self, Error>
    where
        M: IntoIterator,
        M::Item: Into<String>,
        V: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<String>,
    {
        Ok(Self::with_toolchain(
            Environment::new(name, modules, variables)?,
            Toolchain::default(),
        ))
    }

    /// Attach `toolchain` to an existing environment
    #[must_use]
    pub fn with_toolchain(env: Environment, toolchain: Toolchain) -> Self {
        Self { env, toolchain }
    }

    /// The underlying environment
    #[must_use]
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    #[must_use]
    pub fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    /// C compiler
    #[must_use]
    pub fn cc(&self) -> &str {
        &self.toolchain.cc
    }

    /// C++ compiler
    #[must_use]
    pub fn cxx(&self) -> Option<&str> {
        self.toolchain.cxx.as_deref()
    }

    /// Fortran compiler
    #[must_use]
    pub fn ftn(&self) -> Option<&str> {
        self.toolchain.ftn.as_deref()
    }

    /// CUDA compiler
    #[must_use]
    pub fn nvcc(&self) -> &str {
        &self.toolchain.nvcc
    }

    #[must_use]
    pub fn cppflags(&self) -> Option<&str> {
        self.toolchain.cppflags.as_deref()
    }

    #[must_use]
    pub fn cflags(&self) -> Option<&str> {
        self.toolchain.cflags.as_deref()
    }

    #[must_use]
    pub fn cxxflags(&self) -> Option<&str> {
        self.toolchain.cxxflags.as_deref()
    }

    #[must_use]
    pub fn fflags(&self) -> Option<&str> {
        self.toolchain.fflags.as_deref()
    }

    #[must_use]
    pub fn ldflags(&self) -> Option<&str> {
        self.toolchain.ldflags.as_deref()
    }

    #[must_use]
    pub fn include_search_path(&self) -> &[String] {
        &self.toolchain.include_search_path
    }

    /// Whether flags are passed on to build invocations
    #[must_use]
    pub fn propagate(&self) -> bool {
        self.toolchain.propagate
    }
}

impl Deref for ProgEnvironment {
    type Target = Environment;

    fn deref(&self) -> &Environment {
        &self.env
    }
}

impl DerefMut for ProgEnvironment {
    fn deref_mut(&mut self) -> &mut Environment {
        &mut self.env
    }
}

impl PartialEq for ProgEnvironment {
    fn eq(&self, other: &Self) -> bool {
        self.env == other.env
    }
}

impl Eq for ProgEnvironment {}

impl fmt::Display for ProgEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.env, f)
    }
}

impl fmt::Debug for ProgEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ProgEnvironment");
        self.env.debug_fields(&mut s);
        s.field("cc", &self.toolchain.cc)
            .field("cxx", &self.toolchain.cxx)
            .field("ftn", &self.toolchain.ftn)
            .finish_non_exhaustive()
    }
}

impl Activation for ProgEnvironment {
    fn name(&self) -> &str {
        self.env.name()
    }

    fn load(&mut self, rt: &Runtime) -> Result<(), Error> {
        self.env.load(rt)
    }

    fn unload(&mut self, rt: &Runtime) -> Result<(), Error> {
        self.env.unload(rt)
    }

    fn is_loaded(&self, rt: &Runtime) -> Result<bool, Error> {
        self.env.is_loaded(rt)
    }

    fn emit_load_commands(&self, rt: &Runtime) -> Vec<String> {
        self.env.emit_load_commands(rt)
    }
}
