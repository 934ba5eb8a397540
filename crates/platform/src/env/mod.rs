//! Ambient environment variable storage
//!
//! Everything that reads or mutates "the environment" goes through
//! [`EnvStore`], so the same activation logic runs against the real process
//! environment or against an isolated in-memory map.

mod memory;
mod process;

pub use memory::MemoryEnv;
pub use process::ProcessEnv;

use indexmap::IndexMap;
use modenv_errors::PlatformError;

/// Ordered variable mapping used for full copies of an environment
pub type VarMap = IndexMap<String, String>;

/// Get/set/clear capability over an ambient variable mapping
///
/// Implementations use interior mutability so a store can be shared through
/// an `Arc` by the runtime and the module backends at the same time.
pub trait EnvStore: Send + Sync {
    /// Current value of `key`, if set
    fn get(&self, key: &str) -> Option<String>;

    /// Set `key` to `value`
    ///
    /// # Errors
    ///
    /// Returns an error if `key` or `value` cannot be stored in an
    /// environment (empty key, `=` or NUL in the key, NUL in the value).
    fn set(&self, key: &str, value: &str) -> Result<(), PlatformError>;

    /// Remove `key`; removing an unset key is a no-op
    fn remove(&self, key: &str);

    /// Full ordered copy of every variable
    fn vars(&self) -> VarMap;

    /// Remove every variable
    fn clear(&self);

    /// Whether `key` is currently set
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Replace the whole mapping: clear, then bulk-restore `vars`
    ///
    /// # Errors
    ///
    /// Returns the first error from [`EnvStore::set`]; variables before it
    /// have already been written.
    fn replace_all(&self, vars: &VarMap) -> Result<(), PlatformError> {
        self.clear();
        for (key, value) in vars {
            self.set(key, value)?;
        }
        Ok(())
    }
}

/// Check that a key/value pair can live in a process environment
pub(crate) fn validate(key: &str, value: &str) -> Result<(), PlatformError> {
    if key.is_empty() || key.contains('=') || key.contains('\0') || value.contains('\0') {
        return Err(PlatformError::InvalidVariableName {
            name: key.to_string(),
        });
    }
    Ok(())
}
