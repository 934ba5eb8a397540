//! Named module + variable environments

use indexmap::{IndexMap, IndexSet};
use modenv_errors::{ConfigError, EnvironmentError, Error};
use modenv_events::{EnvironmentEvent, EventEmitter, ModuleEvent};
use modenv_types::{is_valid_identifier, ModuleOp};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info};

use crate::expand::expand_vars;
use crate::runtime::Runtime;
use crate::Activation;

/// A named set of modules and variables to activate
///
/// The declared modules and variables never change after construction. The
/// remaining fields describe the current activation cycle and are reset at
/// the start of every [`Environment::load`].
#[derive(Clone)]
pub struct Environment {
    name: String,
    modules: Vec<String>,
    variables: IndexMap<String, String>,

    loaded: bool,
    preloaded: IndexSet<String>,
    module_ops: Vec<(ModuleOp, String)>,
    conflicted: Vec<String>,
    saved_variables: IndexMap<String, String>,
}

impl Environment {
    /// Create an environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the name or a variable name is
    /// not made of word characters and hyphens.
    pub fn new<M, V, K, S>(name: &str, modules: M, variables: V) -> Result<Self, Error>
    where
        M: IntoIterator,
        M::Item: Into<String>,
        V: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<String>,
    {
        if !is_valid_identifier(name) {
            return Err(ConfigError::InvalidValue {
                field: "name".to_string(),
                value: name.to_string(),
            }
            .into());
        }

        let variables: IndexMap<String, String> = variables
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        if let Some(bad) = variables.keys().find(|k| !is_valid_identifier(k)) {
            return Err(ConfigError::InvalidValue {
                field: format!("{name}.variables"),
                value: bad.clone(),
            }
            .into());
        }

        Ok(Self {
            name: name.to_string(),
            modules: modules.into_iter().map(Into::into).collect(),
            variables,
            loaded: false,
            preloaded: IndexSet::new(),
            module_ops: Vec::new(),
            conflicted: Vec::new(),
            saved_variables: IndexMap::new(),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared modules, in load order
    #[must_use]
    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    /// Declared variables, in declaration order
    #[must_use]
    pub fn variables(&self) -> &IndexMap<String, String> {
        &self.variables
    }

    /// Whether [`Environment::load`] succeeded and no unload followed
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.loaded
    }

    /// Modules that were already loaded when this environment was loaded
    #[must_use]
    pub fn preloaded(&self) -> &IndexSet<String> {
        &self.preloaded
    }

    /// Modules forced out by conflicts during the last load
    #[must_use]
    pub fn conflicted(&self) -> &[String] {
        &self.conflicted
    }

    /// Module operations performed during the last load, in order
    #[must_use]
    pub fn module_ops(&self) -> &[(ModuleOp, String)] {
        &self.module_ops
    }

    /// Ambient values that the last load overwrote
    #[must_use]
    pub fn saved_variables(&self) -> &IndexMap<String, String> {
        &self.saved_variables
    }

    fn reset(&mut self) {
        self.preloaded.clear();
        self.module_ops.clear();
        self.conflicted.clear();
        self.saved_variables.clear();
    }

    /// Activate the modules and variables against `rt`
    ///
    /// Conflicting modules are forced out and remembered so that
    /// [`Environment::unload`] can bring them back. A failure part way leaves
    /// what was already applied in place.
    ///
    /// # Errors
    ///
    /// Returns `EnvironmentError::AlreadyLoaded` if this environment is
    /// active, or the first module system or store error.
    pub fn load(&mut self, rt: &Runtime) -> Result<(), Error> {
        if self.loaded {
            return Err(EnvironmentError::AlreadyLoaded {
                name: self.name.clone(),
            }
            .into());
        }
        self.reset();

        info!(environment = %self.name, modules = ?self.modules, "loading environment");
        rt.emit_environment(EnvironmentEvent::Loading {
            name: self.name.clone(),
            modules: self.modules.clone(),
        });

        let backend = rt.modules();
        for module in &self.modules {
            if backend.is_loaded(module)? {
                self.preloaded.insert(module.clone());
            }

            let forced = backend.load(module, true)?;
            if !forced.is_empty() {
                rt.emit_module(ModuleEvent::ConflictResolved {
                    system: backend.name().to_string(),
                    module: module.clone(),
                    unloaded: forced.clone(),
                });
            }
            self.module_ops
                .extend(forced.iter().map(|m| (ModuleOp::Unload, m.clone())));
            self.module_ops.push((ModuleOp::Load, module.clone()));
            self.conflicted.extend(forced);

            debug!(environment = %self.name, module = %module, "module loaded");
            rt.emit_module(ModuleEvent::Loaded {
                system: backend.name().to_string(),
                module: module.clone(),
            });
        }

        let store = rt.env();
        for (key, value) in &self.variables {
            if let Some(old) = store.get(key) {
                self.saved_variables.insert(key.clone(), old);
            }
            store.set(key, &expand_vars(value, store))?;
        }

        self.loaded = true;
        info!(
            environment = %self.name,
            preloaded = self.preloaded.len(),
            conflicted = ?self.conflicted,
            "environment loaded"
        );
        rt.emit_environment(EnvironmentEvent::Loaded {
            name: self.name.clone(),
            preloaded: self.preloaded.iter().cloned().collect(),
            conflicted: self.conflicted.clone(),
            variables_set: self.variables.len(),
        });
        Ok(())
    }

    /// Reverse the last [`Environment::load`]; a no-op when not loaded
    ///
    /// # Errors
    ///
    /// Returns the first module system or store error.
    pub fn unload(&mut self, rt: &Runtime) -> Result<(), Error> {
        if !self.loaded {
            return Ok(());
        }

        let store = rt.env();
        for key in self.variables.keys() {
            if let Some(old) = self.saved_variables.get(key) {
                store.set(key, old)?;
            } else if store.contains(key) {
                store.remove(key);
            }
        }

        let backend = rt.modules();
        for module in self.modules.iter().rev() {
            if self.preloaded.contains(module) {
                continue;
            }
            backend.unload(module)?;
            debug!(environment = %self.name, module = %module, "module unloaded");
            rt.emit_module(ModuleEvent::Unloaded {
                system: backend.name().to_string(),
                module: module.clone(),
            });
        }

        for module in &self.conflicted {
            backend.load(module, false)?;
            debug!(environment = %self.name, module = %module, "conflicting module reloaded");
        }

        self.loaded = false;
        info!(environment = %self.name, "environment unloaded");
        rt.emit_environment(EnvironmentEvent::Unloaded {
            name: self.name.clone(),
            variables_restored: self.saved_variables.len(),
            modules_reloaded: self.conflicted.clone(),
        });
        Ok(())
    }

    /// Whether every module is loaded and every variable holds its value
    ///
    /// # Errors
    ///
    /// Returns an error if the module system cannot be queried.
    pub fn is_loaded(&self, rt: &Runtime) -> Result<bool, Error> {
        for module in &self.modules {
            if !rt.modules().is_loaded(module)? {
                return Ok(false);
            }
        }
        let store = rt.env();
        Ok(self
            .variables
            .iter()
            .all(|(key, value)| store.get(key) == Some(expand_vars(value, store))))
    }

    /// Module operations to render: the recorded log, or plain loads of the
    /// declared modules if this environment was never loaded
    fn ops_for_emission(&self) -> Vec<(ModuleOp, &str)> {
        if self.module_ops.is_empty() {
            self.modules
                .iter()
                .map(|m| (ModuleOp::Load, m.as_str()))
                .collect()
        } else {
            self.module_ops
                .iter()
                .map(|(op, m)| (*op, m.as_str()))
                .collect()
        }
    }

    /// Shell commands that reproduce [`Environment::load`]
    ///
    /// Variable values are emitted unexpanded so the shell expands them.
    #[must_use]
    pub fn emit_load_commands(&self, rt: &Runtime) -> Vec<String> {
        let backend = rt.modules();
        let mut commands: Vec<String> = self
            .ops_for_emission()
            .into_iter()
            .flat_map(|(op, module)| match op {
                ModuleOp::Load => backend.emit_load_commands(module),
                ModuleOp::Unload => backend.emit_unload_commands(module),
            })
            .collect();

        commands.extend(
            self.variables
                .iter()
                .map(|(key, value)| format!("export {key}={value}")),
        );
        commands
    }

    /// Shell commands that reproduce [`Environment::unload`]
    #[must_use]
    pub fn emit_unload_commands(&self, rt: &Runtime) -> Vec<String> {
        let backend = rt.modules();
        let mut commands: Vec<String> = self
            .variables
            .keys()
            .map(|key| format!("unset {key}"))
            .collect();

        commands.extend(
            self.ops_for_emission()
                .into_iter()
                .rev()
                .flat_map(|(op, module)| match op.inverse() {
                    ModuleOp::Load => backend.emit_load_commands(module),
                    ModuleOp::Unload => backend.emit_unload_commands(module),
                }),
        );
        commands
    }

    /// Multi-line human readable description
    #[must_use]
    pub fn details(&self) -> String {
        let mut out = format!(
            "{}:\n    modules: {}\n    variables:",
            self.name,
            self.modules.join(", ")
        );
        for (key, value) in &self.variables {
            out.push_str(&format!("\n        - {key}={value}"));
        }
        out
    }

    pub(crate) fn debug_fields(&self, f: &mut fmt::DebugStruct<'_, '_>) {
        f.field("name", &self.name)
            .field("modules", &self.modules)
            .field("variables", &self.variables);
    }
}

impl PartialEq for Environment {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.modules.iter().collect::<HashSet<_>>()
                == other.modules.iter().collect::<HashSet<_>>()
            && self.variables == other.variables
    }
}

impl Eq for Environment {}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Environment");
        self.debug_fields(&mut s);
        s.finish()
    }
}

impl Activation for Environment {
    fn name(&self) -> &str {
        &self.name
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

/// Unload `src`, then load `dst`
///
/// # Errors
///
/// Returns the first error from either step; `dst` is not loaded if
/// unloading `src` failed.
pub fn swap_environments<S, D>(src: &mut S, dst: &mut D, rt: &Runtime) -> Result<(), Error>
where
    S: Activation + ?Sized,
    D: Activation + ?Sized,
{
    debug!(from = src.name(), to = dst.name(), "swapping environments");
    src.unload(rt)?;
    dst.load(rt)
}
