//! Process environment store

use modenv_errors::PlatformError;
use std::collections::HashSet;

use super::{validate, EnvStore, VarMap};

/// The real environment of the running process
///
/// Variables that are not valid UTF-8 are read lossily. `replace_all` leaves
/// a variable untouched when its lossy form already matches the target, so a
/// round trip through [`EnvStore::vars`] keeps the original bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl ProcessEnv {
    /// Create a handle to the process environment
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl EnvStore for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        if key.is_empty() || key.contains('=') || key.contains('\0') {
            return None;
        }
        std::env::var_os(key).map(|value| value.to_string_lossy().into_owned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PlatformError> {
        validate(key, value)?;
        std::env::set_var(key, value);
        Ok(())
    }

    fn remove(&self, key: &str) {
        if validate(key, "").is_ok() {
            std::env::remove_var(key);
        }
    }

    fn vars(&self) -> VarMap {
        std::env::vars_os()
            .map(|(k, v)| {
                (
                    k.to_string_lossy().into_owned(),
                    v.to_string_lossy().into_owned(),
                )
            })
            .collect()
    }

    fn clear(&self) {
        for (key, _) in std::env::vars_os() {
            std::env::remove_var(key);
        }
    }

    fn replace_all(&self, vars: &VarMap) -> Result<(), PlatformError> {
        let mut unchanged = HashSet::new();
        for (key, value) in std::env::vars_os() {
            let lossy_key = key.to_string_lossy().into_owned();
            if vars.get(&lossy_key).map(String::as_str) == Some(&*value.to_string_lossy()) {
                unchanged.insert(lossy_key);
            } else {
                std::env::remove_var(key);
            }
        }

        for (key, value) in vars {
            if !unchanged.contains(key) {
                self.set(key, value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure process env tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_replace_all_sets_and_removes() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        let store = ProcessEnv::new();
        store.set("MODENV_TEST_STALE", "old").unwrap();

        let mut target = store.vars();
        target.shift_remove("MODENV_TEST_STALE");
        target.insert("MODENV_TEST_ADDED".to_string(), "1".to_string());
        store.replace_all(&target).unwrap();

        assert!(!store.contains("MODENV_TEST_STALE"));
        assert_eq!(store.get("MODENV_TEST_ADDED").as_deref(), Some("1"));

        store.remove("MODENV_TEST_ADDED");
    }

    #[cfg(unix)]
    #[test]
    fn test_replace_all_keeps_non_utf8_values() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        let raw = OsStr::from_bytes(b"a\xFFb");
        std::env::set_var("MODENV_TEST_RAW", raw);

        let store = ProcessEnv::new();
        let saved = store.vars();
        assert_eq!(saved["MODENV_TEST_RAW"], "a\u{FFFD}b");

        store.set("MODENV_TEST_ADDED", "1").unwrap();
        store.replace_all(&saved).unwrap();
        assert_eq!(std::env::var_os("MODENV_TEST_RAW").as_deref(), Some(raw));
        assert!(!store.contains("MODENV_TEST_ADDED"));

        std::env::remove_var("MODENV_TEST_RAW");
    }
}
