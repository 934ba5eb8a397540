//! In-process module system
//!
//! Keeps the loaded-module list in memory and applies each module's variables
//! to an optional [`EnvStore`]. Conflicts are declared up front as pairs of
//! module patterns.

use modenv_errors::{Error, ModuleError};
use modenv_platform::EnvStore;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::{module_matches, ModuleBackend};

#[derive(Default)]
struct State {
    loaded: Vec<String>,
    available: Option<HashSet<String>>,
    conflicts: Vec<(String, String)>,
    variables: HashMap<String, Vec<(String, String)>>,
}

impl State {
    fn conflicts_of(&self, module: &str) -> Vec<String> {
        self.loaded
            .iter()
            .filter(|loaded| loaded.as_str() != module)
            .filter(|loaded| {
                self.conflicts.iter().any(|(a, b)| {
                    (module_matches(a, module) && module_matches(b, loaded))
                        || (module_matches(b, module) && module_matches(a, loaded))
                })
            })
            .cloned()
            .collect()
    }
}

/// Module system kept entirely in memory
pub struct MemoryModules {
    state: Mutex<State>,
    env: Option<Arc<dyn EnvStore>>,
}

impl fmt::Debug for MemoryModules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryModules")
            .field("loaded", &self.lock().loaded)
            .finish_non_exhaustive()
    }
}

impl Default for MemoryModules {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryModules {
    /// Create a module system that accepts any module name
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            env: None,
        }
    }

    /// Restrict loadable modules to `modules`; anything else is not found
    #[must_use]
    pub fn with_available<I, S>(self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock()
            .available
            .get_or_insert_with(HashSet::new)
            .extend(modules.into_iter().map(Into::into));
        self
    }

    /// Declare that modules matching `a` and `b` cannot be loaded together
    #[must_use]
    pub fn with_conflict(self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.lock().conflicts.push((a.into(), b.into()));
        self
    }

    /// Variables `module` sets while loaded
    #[must_use]
    pub fn with_module_vars<I, K, V>(self, module: impl Into<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.lock().variables.insert(
            module.into(),
            vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        );
        self
    }

    /// Apply module variables to `env`
    #[must_use]
    pub fn with_env(mut self, env: Arc<dyn EnvStore>) -> Self {
        self.env = Some(env);
        self
    }

    /// Start with `modules` already loaded, without applying their variables
    #[must_use]
    pub fn with_loaded<I, S>(self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock()
            .loaded
            .extend(modules.into_iter().map(Into::into));
        self
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply_vars(&self, state: &State, module: &str) -> Result<(), Error> {
        if let (Some(env), Some(vars)) = (&self.env, state.variables.get(module)) {
            for (key, value) in vars {
                env.set(key, value)?;
            }
        }
        Ok(())
    }

    fn remove_vars(&self, state: &State, module: &str) {
        if let (Some(env), Some(vars)) = (&self.env, state.variables.get(module)) {
            for (key, _) in vars {
                env.remove(key);
            }
        }
    }

    fn unload_locked(&self, state: &mut State, module: &str) {
        if let Some(pos) = state.loaded.iter().position(|m| m == module) {
            state.loaded.remove(pos);
            self.remove_vars(state, module);
            debug!(module, "memory module unloaded");
        }
    }
}

impl ModuleBackend for MemoryModules {
    fn name(&self) -> &str {
        "memory"
    }

    fn is_loaded(&self, module: &str) -> Result<bool, Error> {
        Ok(self.lock().loaded.iter().any(|m| module_matches(module, m)))
    }

    fn load(&self, module: &str, force: bool) -> Result<Vec<String>, Error> {
        let mut state = self.lock();

        if let Some(available) = &state.available {
            if !available.contains(module) {
                return Err(ModuleError::NotFound {
                    name: module.to_string(),
                }
                .into());
            }
        }

        if state.loaded.iter().any(|m| module_matches(module, m)) {
            return Ok(Vec::new());
        }

        let conflicts = state.conflicts_of(module);
        if !conflicts.is_empty() && !force {
            return Err(ModuleError::Conflict {
                name: module.to_string(),
                conflicts,
            }
            .into());
        }

        for conflicted in &conflicts {
            self.unload_locked(&mut state, conflicted);
        }

        state.loaded.push(module.to_string());
        self.apply_vars(&state, module)?;
        debug!(module, forced = ?conflicts, "memory module loaded");
        Ok(conflicts)
    }

    fn unload(&self, module: &str) -> Result<(), Error> {
        let mut state = self.lock();
        self.unload_locked(&mut state, module);
        Ok(())
    }

    fn loaded_modules(&self) -> Result<Vec<String>, Error> {
        Ok(self.lock().loaded.clone())
    }

    fn emit_load_commands(&self, module: &str) -> Vec<String> {
        vec![format!("module load {module}")]
    }

    fn emit_unload_commands(&self, module: &str) -> Vec<String> {
        vec![format!("module unload {module}")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modenv_platform::MemoryEnv;

    #[test]
    fn test_load_is_idempotent() {
        let modules = MemoryModules::new();
        assert!(modules.load("gcc/7.3.0", true).unwrap().is_empty());
        assert!(modules.load("gcc/7.3.0", true).unwrap().is_empty());
        assert_eq!(modules.loaded_modules().unwrap(), vec!["gcc/7.3.0"]);
    }

    #[test]
    fn test_bare_name_matches_loaded_version() {
        let modules = MemoryModules::new().with_loaded(["gcc/7.3.0"]);
        assert!(modules.is_loaded("gcc").unwrap());
        assert!(modules.is_loaded("gcc/7.3.0").unwrap());
        assert!(!modules.is_loaded("gcc/8.1.0").unwrap());
        assert!(!modules.is_loaded("gc").unwrap());

        assert!(modules.load("gcc", true).unwrap().is_empty());
        assert_eq!(modules.loaded_modules().unwrap(), vec!["gcc/7.3.0"]);
    }

    #[test]
    fn test_conflict_requires_force() {
        let modules = MemoryModules::new()
            .with_conflict("gcc", "intel")
            .with_loaded(["intel/18.0"]);

        let err = modules.load("gcc/7.3.0", false).unwrap_err();
        assert!(matches!(err, Error::Module(ModuleError::Conflict { .. })));

        let forced = modules.load("gcc/7.3.0", true).unwrap();
        assert_eq!(forced, vec!["intel/18.0"]);
        assert_eq!(modules.loaded_modules().unwrap(), vec!["gcc/7.3.0"]);
    }

    #[test]
    fn test_unknown_module() {
        let modules = MemoryModules::new().with_available(["gcc/7.3.0"]);
        let err = modules.load("clang/9", true).unwrap_err();
        assert!(matches!(err, Error::Module(ModuleError::NotFound { .. })));
    }

    #[test]
    fn test_module_vars_follow_load_state() {
        let env = Arc::new(MemoryEnv::new());
        let modules = MemoryModules::new()
            .with_module_vars("gcc/7.3.0", [("GCC_HOME", "/opt/gcc/7.3.0")])
            .with_env(env.clone());

        modules.load("gcc/7.3.0", true).unwrap();
        assert_eq!(env.get("GCC_HOME").as_deref(), Some("/opt/gcc/7.3.0"));

        modules.unload("gcc/7.3.0").unwrap();
        assert!(!env.contains("GCC_HOME"));
    }
}
