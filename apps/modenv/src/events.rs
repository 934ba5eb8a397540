//! Event handling and user feedback

use modenv_events::{AppEvent, EnvironmentEvent, EventReceiver, GeneralEvent, ModuleEvent};

use crate::logging::log_event_with_tracing;

/// Routes engine events into tracing and surfaces the ones a user must see
pub struct EventHandler {
    /// Suppress stderr notices so JSON output stays clean
    quiet: bool,
    /// Notices shown so far
    shown: usize,
}

impl EventHandler {
    pub fn new(quiet: bool) -> Self {
        Self { quiet, shown: 0 }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, event: &AppEvent) {
        log_event_with_tracing(event);

        if let Some(message) = notice(event) {
            self.shown += 1;
            if !self.quiet {
                eprintln!("{message}");
            }
        }
    }

    /// Handle every event already queued on `receiver`
    pub fn drain(&mut self, receiver: &mut EventReceiver) {
        while let Ok(event) = receiver.try_recv() {
            self.handle_event(&event);
        }
    }

    pub fn notices_shown(&self) -> usize {
        self.shown
    }
}

/// The stderr line for events worth interrupting the user for
fn notice(event: &AppEvent) -> Option<String> {
    match event {
        AppEvent::General(GeneralEvent::Deprecation { message, .. }) => {
            Some(format!("Deprecated: {message}"))
        }
        AppEvent::General(GeneralEvent::Warning { message, context }) => Some(match context {
            Some(context) => format!("Warning: {message} ({context})"),
            None => format!("Warning: {message}"),
        }),
        AppEvent::General(GeneralEvent::Error { message, .. }) => Some(format!("Error: {message}")),
        AppEvent::Environment(EnvironmentEvent::RestoreFailed { name, failure }) => Some(format!(
            "Error: could not restore environment '{name}': {}",
            failure.message
        )),
        AppEvent::Module(ModuleEvent::ConflictResolved {
            module, unloaded, ..
        }) => Some(format!(
            "Loading {module} unloaded conflicting modules: {}",
            unloaded.join(", ")
        )),
        _ => None,
    }
}
