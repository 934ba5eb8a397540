//! In-memory environment store

use std::sync::{Mutex, MutexGuard, PoisonError};

use modenv_errors::PlatformError;

use super::{validate, EnvStore, VarMap};

/// Environment store backed by an ordered map
///
/// Used by tests and by dry runs that must not touch the real process
/// environment.
#[derive(Debug, Default)]
pub struct MemoryEnv {
    vars: Mutex<VarMap>,
}

impl MemoryEnv {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `vars`
    #[must_use]
    pub fn with_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: Mutex::new(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VarMap> {
        self.vars.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EnvStore for MemoryEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PlatformError> {
        validate(key, value)?;
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.lock().shift_remove(key);
    }

    fn vars(&self) -> VarMap {
        self.lock().clone()
    }

    fn clear(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let env = MemoryEnv::new();
        env.set("CC", "gcc").unwrap();
        assert_eq!(env.get("CC").as_deref(), Some("gcc"));
        assert!(env.contains("CC"));

        env.remove("CC");
        assert!(!env.contains("CC"));
        // removing again is a no-op
        env.remove("CC");
    }

    #[test]
    fn test_replace_all_drops_unlisted_vars() {
        let env = MemoryEnv::with_vars([("A", "1"), ("B", "2")]);
        let mut target = VarMap::new();
        target.insert("C".to_string(), "3".to_string());

        env.replace_all(&target).unwrap();
        assert_eq!(env.vars(), target);
    }

    #[test]
    fn test_vars_preserve_insertion_order() {
        let env = MemoryEnv::new();
        env.set("Z", "1").unwrap();
        env.set("A", "2").unwrap();
        let keys: Vec<_> = env.vars().into_keys().collect();
        assert_eq!(keys, vec!["Z", "A"]);
    }
}
