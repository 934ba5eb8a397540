#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Environment composition engine for modenv
//!
//! An [`Environment`] names a set of modules and variables. Loading it
//! activates them against the ambient state held by a [`Runtime`] and
//! remembers enough to reverse the change; emitting it renders the same
//! transition as shell text for a job script.
//!
//! Whole-environment save/restore is handled by [`EnvironmentSnapshot`] and
//! the [`SavedEnvironment`] scope guard.

mod configured;
mod environment;
mod expand;
mod guard;
pub mod prog;
pub mod runtime;
mod snapshot;

pub use configured::ConfiguredEnvironment;
pub use environment::{swap_environments, Environment};
pub use expand::{expand_vars, expand_with};
pub use guard::SavedEnvironment;
pub use prog::{ProgEnvironment, Toolchain};
pub use runtime::Runtime;
pub use snapshot::{EnvironmentSnapshot, DEFAULT_SNAPSHOT_NAME};

use modenv_errors::Error;

/// Operations shared by everything that can be activated against a runtime
pub trait Activation {
    /// Display name
    fn name(&self) -> &str;

    /// Activate against the runtime's ambient state
    ///
    /// # Errors
    ///
    /// Returns an error if activation is not allowed in the current state or
    /// a module system or store operation fails.
    fn load(&mut self, rt: &Runtime) -> Result<(), Error>;

    /// Reverse a previous activation
    ///
    /// # Errors
    ///
    /// Returns an error if the operation is unsupported or a module system or
    /// store operation fails.
    fn unload(&mut self, rt: &Runtime) -> Result<(), Error>;

    /// Whether the ambient state currently matches this activation
    ///
    /// # Errors
    ///
    /// Returns an error if the operation is unsupported or the module system
    /// cannot be queried.
    fn is_loaded(&self, rt: &Runtime) -> Result<bool, Error>;

    /// Shell commands reproducing `load`
    fn emit_load_commands(&self, rt: &Runtime) -> Vec<String>;
}
