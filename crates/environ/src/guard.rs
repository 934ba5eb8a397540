//! RAII guard restoring a snapshot on scope exit
//!
//! [`SavedEnvironment`] captures the ambient state when created and writes it
//! back when dropped, on every exit path including early returns and
//! unwinding. Guards must be nested: restoring in any other order leaves the
//! state of whichever guard dropped last.

use modenv_errors::Error;
use modenv_events::{EnvironmentEvent, EventEmitter, FailureContext};
use tracing::warn;

use crate::runtime::Runtime;
use crate::snapshot::EnvironmentSnapshot;

/// Scope guard holding a snapshot to restore
#[derive(Debug)]
pub struct SavedEnvironment<'rt> {
    snapshot: EnvironmentSnapshot,
    runtime: &'rt Runtime,
    restored: bool,
}

impl<'rt> SavedEnvironment<'rt> {
    /// Capture the current state of `runtime`
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be captured.
    pub fn new(runtime: &'rt Runtime) -> Result<Self, Error> {
        Ok(Self {
            snapshot: EnvironmentSnapshot::capture(runtime)?,
            runtime,
            restored: false,
        })
    }

    /// The state that will be restored
    #[must_use]
    pub fn snapshot(&self) -> &EnvironmentSnapshot {
        &self.snapshot
    }

    /// Restore now and report the outcome instead of logging it
    ///
    /// # Errors
    ///
    /// Returns an error if a captured variable cannot be written back.
    pub fn restore(mut self) -> Result<(), Error> {
        self.restored = true;
        self.snapshot.load(self.runtime)
    }
}

impl Drop for SavedEnvironment<'_> {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        // Errors cannot leave a destructor; report them instead
        if let Err(e) = self.snapshot.load(self.runtime) {
            warn!(snapshot = %self.snapshot.name(), error = %e, "failed to restore saved environment");
            self.runtime
                .emit_environment(EnvironmentEvent::RestoreFailed {
                    name: self.snapshot.name().to_string(),
                    failure: FailureContext::from_error(&e),
                });
        }
    }
}
