#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Module system backends for modenv
//!
//! A module system adds and removes software (paths, variables) from the
//! ambient environment by name. The environment engine only talks to the
//! [`ModuleBackend`] trait; the concrete flavour is chosen at runtime from
//! configuration with [`from_kind`].

mod memory;
mod nomod;
mod shell;

pub use memory::MemoryModules;
pub use nomod::NoModules;
pub use shell::{parse_shell_output, ShellAction, ShellFlavor, ShellModules};

use modenv_errors::Error;
use modenv_platform::{EnvStore, ProcessOperations};
use modenv_types::ModuleSystemKind;
use std::sync::Arc;

/// Capability contract every module system variant implements
pub trait ModuleBackend: Send + Sync {
    /// Short name of the module system (`nomod`, `memory`, `tmod`, `lmod`)
    fn name(&self) -> &str;

    /// Whether `module` is currently loaded
    ///
    /// # Errors
    ///
    /// Returns an error if the module system cannot be queried.
    fn is_loaded(&self, module: &str) -> Result<bool, Error>;

    /// Load `module`
    ///
    /// With `force`, modules that conflict with `module` are unloaded first;
    /// their names are returned in the order they were unloaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the module does not exist, conflicts without
    /// `force`, or the module tool fails.
    fn load(&self, module: &str, force: bool) -> Result<Vec<String>, Error>;

    /// Unload `module`; unloading a module that is not loaded is a no-op
    ///
    /// # Errors
    ///
    /// Returns an error if the module tool fails.
    fn unload(&self, module: &str) -> Result<(), Error>;

    /// Currently loaded modules, in load order
    ///
    /// # Errors
    ///
    /// Returns an error if the module system cannot be queried.
    fn loaded_modules(&self) -> Result<Vec<String>, Error>;

    /// Shell commands that load `module` in a job script
    fn emit_load_commands(&self, module: &str) -> Vec<String>;

    /// Shell commands that unload `module` in a job script
    fn emit_unload_commands(&self, module: &str) -> Vec<String>;
}

/// Whether `module` is `pattern` or a version of it (`gcc` matches `gcc/7.3.0`)
#[must_use]
pub fn module_matches(pattern: &str, module: &str) -> bool {
    module == pattern
        || module
            .strip_prefix(pattern)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Build the backend for a configured module system
///
/// # Errors
///
/// Returns an error if the selected module tool cannot be located.
pub fn from_kind(
    kind: ModuleSystemKind,
    env: Arc<dyn EnvStore>,
    ops: Arc<dyn ProcessOperations>,
) -> Result<Arc<dyn ModuleBackend>, Error> {
    let backend: Arc<dyn ModuleBackend> = match kind {
        ModuleSystemKind::Nomod => Arc::new(NoModules::new()),
        ModuleSystemKind::Tmod => Arc::new(ShellModules::tmod(env, ops)?),
        ModuleSystemKind::Lmod => Arc::new(ShellModules::lmod(env, ops)?),
    };
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_matches_versions() {
        assert!(module_matches("gcc", "gcc"));
        assert!(module_matches("gcc", "gcc/7.3.0"));
        assert!(module_matches("gcc/7.3.0", "gcc/7.3.0"));
        assert!(!module_matches("gcc", "gcc-cuda"));
        assert!(!module_matches("gcc/7.3.0", "gcc"));
    }
}
