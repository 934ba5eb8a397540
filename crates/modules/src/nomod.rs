//! Backend for hosts without a module system

use modenv_errors::Error;

use crate::ModuleBackend;

/// Module system that does nothing
///
/// Every module is reported as not loaded, loads change nothing and no
/// commands are emitted.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoModules;

impl NoModules {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ModuleBackend for NoModules {
    fn name(&self) -> &str {
        "nomod"
    }

    fn is_loaded(&self, _module: &str) -> Result<bool, Error> {
        Ok(false)
    }

    fn load(&self, _module: &str, _force: bool) -> Result<Vec<String>, Error> {
        Ok(Vec::new())
    }

    fn unload(&self, _module: &str) -> Result<(), Error> {
        Ok(())
    }

    fn loaded_modules(&self) -> Result<Vec<String>, Error> {
        Ok(Vec::new())
    }

    fn emit_load_commands(&self, _module: &str) -> Vec<String> {
        Vec::new()
    }

    fn emit_unload_commands(&self, _module: &str) -> Vec<String> {
        Vec::new()
    }
}
