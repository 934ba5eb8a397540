//! Process-wide runtime registry
//!
//! A [`Runtime`] bundles the active module system, the ambient variable store
//! and an optional event sender. Core operations take it explicitly; callers
//! that need a single shared instance install one with [`init`] and fetch it
//! with [`current`].

use modenv_errors::{EnvironmentError, Error};
use modenv_events::{EventEmitter, EventSender};
use modenv_modules::ModuleBackend;
use modenv_platform::EnvStore;
use std::fmt;
use std::sync::{Arc, OnceLock};

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Handles to the ambient state environments are activated against
#[derive(Clone)]
pub struct Runtime {
    modules: Arc<dyn ModuleBackend>,
    env: Arc<dyn EnvStore>,
    events: Option<EventSender>,
}

impl Runtime {
    #[must_use]
    pub fn new(modules: Arc<dyn ModuleBackend>, env: Arc<dyn EnvStore>) -> Self {
        Self {
            modules,
            env,
            events: None,
        }
    }

    /// Report activity through `sender`
    #[must_use]
    pub fn with_event_sender(mut self, sender: EventSender) -> Self {
        self.events = Some(sender);
        self
    }

    /// The active module system
    #[must_use]
    pub fn modules(&self) -> &dyn ModuleBackend {
        self.modules.as_ref()
    }

    /// The ambient variable store
    #[must_use]
    pub fn env(&self) -> &dyn EnvStore {
        self.env.as_ref()
    }
}

impl EventEmitter for Runtime {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events.as_ref()
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("modules", &self.modules.name())
            .field("events", &self.events.is_some())
            .finish_non_exhaustive()
    }
}

/// Install the process-wide runtime
///
/// # Errors
///
/// Returns `EnvironmentError::RuntimeAlreadyInitialized` if a runtime was
/// already installed; the module system cannot be swapped mid-run.
pub fn init(runtime: Runtime) -> Result<&'static Runtime, Error> {
    RUNTIME
        .set(runtime)
        .map_err(|_| EnvironmentError::RuntimeAlreadyInitialized)?;
    current()
}

/// The process-wide runtime
///
/// # Errors
///
/// Returns `EnvironmentError::RuntimeNotInitialized` before [`init`].
pub fn current() -> Result<&'static Runtime, Error> {
    RUNTIME
        .get()
        .ok_or_else(|| EnvironmentError::RuntimeNotInitialized.into())
}
