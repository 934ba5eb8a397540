//! Whole-environment snapshots

use modenv_errors::{EnvironmentError, Error};
use modenv_events::{EnvironmentEvent, EventEmitter};
use modenv_platform::VarMap;
use std::fmt;
use tracing::debug;

use crate::runtime::Runtime;
use crate::Activation;

/// Name given to snapshots captured without one
pub const DEFAULT_SNAPSHOT_NAME: &str = "env_snapshot";

/// Everything loaded and set at one instant
///
/// Unlike an [`Environment`](crate::Environment), a snapshot has no declared
/// subset: loading it reconciles the loaded modules with the captured list
/// and replaces the whole ambient variable mapping. There is no baseline to
/// undo towards, so `unload` and `is_loaded` are unsupported.
#[derive(Clone, PartialEq, Eq)]
pub struct EnvironmentSnapshot {
    name: String,
    modules: Vec<String>,
    variables: VarMap,
}

impl EnvironmentSnapshot {
    /// Capture the current state of `rt` as [`DEFAULT_SNAPSHOT_NAME`]
    ///
    /// # Errors
    ///
    /// Returns an error if the loaded modules cannot be queried.
    pub fn capture(rt: &Runtime) -> Result<Self, Error> {
        Self::capture_named(DEFAULT_SNAPSHOT_NAME, rt)
    }

    /// Capture the current state of `rt` under `name`
    ///
    /// # Errors
    ///
    /// Returns an error if the loaded modules cannot be queried.
    pub fn capture_named(name: &str, rt: &Runtime) -> Result<Self, Error> {
        let snapshot = Self {
            name: name.to_string(),
            modules: rt.modules().loaded_modules()?,
            variables: rt.env().vars(),
        };
        debug!(
            snapshot = %snapshot.name,
            modules = snapshot.modules.len(),
            variables = snapshot.variables.len(),
            "captured environment snapshot"
        );
        rt.emit_environment(EnvironmentEvent::SnapshotCaptured {
            name: snapshot.name.clone(),
            modules: snapshot.modules.len(),
            variables: snapshot.variables.len(),
        });
        Ok(snapshot)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Modules loaded at capture time, in load order
    #[must_use]
    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    /// Every variable set at capture time
    #[must_use]
    pub fn variables(&self) -> &VarMap {
        &self.variables
    }

    /// Bring the loaded modules and the ambient variables back to the
    /// captured state
    ///
    /// Variables are written back even when reconciling the modules fails;
    /// the module error is returned afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if a module cannot be unloaded or reloaded, or a
    /// captured variable cannot be written back.
    pub fn load(&self, rt: &Runtime) -> Result<(), Error> {
        let modules = self.restore_modules(rt);
        rt.env().replace_all(&self.variables)?;
        modules?;
        debug!(snapshot = %self.name, "restored environment snapshot");
        rt.emit_environment(EnvironmentEvent::SnapshotRestored {
            name: self.name.clone(),
            variables: self.variables.len(),
        });
        Ok(())
    }

    /// Unload modules loaded since capture, newest first, then reload the
    /// captured ones that went missing
    fn restore_modules(&self, rt: &Runtime) -> Result<(), Error> {
        let backend = rt.modules();
        let current = backend.loaded_modules()?;

        for module in current.iter().rev().filter(|m| !self.modules.contains(m)) {
            backend.unload(module)?;
            debug!(snapshot = %self.name, module = %module, "unloaded module loaded after capture");
        }
        for module in self.modules.iter().filter(|m| !current.contains(m)) {
            backend.load(module, true)?;
            debug!(snapshot = %self.name, module = %module, "reloaded captured module");
        }
        Ok(())
    }

    /// Always fails: a snapshot cannot be unloaded
    ///
    /// # Errors
    ///
    /// Always returns `EnvironmentError::Unsupported`.
    pub fn unload(&self) -> Result<(), Error> {
        Err(self.unsupported("unload"))
    }

    /// Always fails: a snapshot has no loaded state to check
    ///
    /// # Errors
    ///
    /// Always returns `EnvironmentError::Unsupported`.
    pub fn is_loaded(&self) -> Result<bool, Error> {
        Err(self.unsupported("is_loaded"))
    }

    fn unsupported(&self, operation: &str) -> Error {
        EnvironmentError::Unsupported {
            name: self.name.clone(),
            operation: operation.to_string(),
        }
        .into()
    }

    /// Shell commands that rebuild this snapshot in a job script
    #[must_use]
    pub fn emit_load_commands(&self, rt: &Runtime) -> Vec<String> {
        let backend = rt.modules();
        self.modules
            .iter()
            .flat_map(|module| backend.emit_load_commands(module))
            .chain(
                self.variables
                    .iter()
                    .map(|(key, value)| format!("export {key}={value}")),
            )
            .collect()
    }
}

impl fmt::Display for EnvironmentSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for EnvironmentSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentSnapshot")
            .field("name", &self.name)
            .field("modules", &self.modules)
            .field("variables", &self.variables.len())
            .finish()
    }
}

impl Activation for EnvironmentSnapshot {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&mut self, rt: &Runtime) -> Result<(), Error> {
        EnvironmentSnapshot::load(self, rt)
    }

    fn unload(&mut self, _rt: &Runtime) -> Result<(), Error> {
        EnvironmentSnapshot::unload(self)
    }

    fn is_loaded(&self, _rt: &Runtime) -> Result<bool, Error> {
        EnvironmentSnapshot::is_loaded(self)
    }

    fn emit_load_commands(&self, rt: &Runtime) -> Vec<String> {
        EnvironmentSnapshot::emit_load_commands(self, rt)
    }
}
