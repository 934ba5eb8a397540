//! Structured logging integration for events
//!
//! Converts domain events into tracing records with structured fields, at
//! the level each event reports for itself.

use modenv_events::{AppEvent, EnvironmentEvent, GeneralEvent, ModuleEvent};
use tracing::{debug, error, info, warn};

/// Log an `AppEvent` using the tracing infrastructure with structured fields
pub fn log_event_with_tracing(event: &AppEvent) {
    match event {
        AppEvent::Environment(env_event) => log_environment_event(env_event),
        AppEvent::Module(module_event) => log_module_event(module_event),
        AppEvent::General(general_event) => log_general_event(general_event),
    }
}

fn log_environment_event(event: &EnvironmentEvent) {
    match event {
        EnvironmentEvent::Loading { name, modules } => {
            info!(environment = %name, modules = ?modules, "Loading environment");
        }
        EnvironmentEvent::Loaded {
            name,
            preloaded,
            conflicted,
            variables_set,
        } => {
            info!(
                environment = %name,
                preloaded = ?preloaded,
                conflicted = ?conflicted,
                variables_set = variables_set,
                "Environment loaded"
            );
        }
        EnvironmentEvent::Unloaded {
            name,
            variables_restored,
            modules_reloaded,
        } => {
            info!(
                environment = %name,
                variables_restored = variables_restored,
                modules_reloaded = ?modules_reloaded,
                "Environment unloaded"
            );
        }
        EnvironmentEvent::SnapshotCaptured {
            name,
            modules,
            variables,
        } => {
            info!(snapshot = %name, modules = modules, variables = variables, "Snapshot captured");
        }
        EnvironmentEvent::SnapshotRestored { name, variables } => {
            info!(snapshot = %name, variables = variables, "Snapshot restored");
        }
        EnvironmentEvent::RestoreFailed { name, failure } => {
            error!(
                snapshot = %name,
                code = ?failure.code,
                message = %failure.message,
                hint = ?failure.hint,
                retryable = failure.retryable,
                "Restoring saved environment failed"
            );
        }
    }
}

fn log_module_event(event: &ModuleEvent) {
    match event {
        ModuleEvent::Loaded { system, module } => {
            debug!(system = %system, module = %module, "Module loaded");
        }
        ModuleEvent::Unloaded { system, module } => {
            debug!(system = %system, module = %module, "Module unloaded");
        }
        ModuleEvent::ConflictResolved {
            system,
            module,
            unloaded,
        } => {
            warn!(
                system = %system,
                module = %module,
                unloaded = ?unloaded,
                "Conflicting modules unloaded"
            );
        }
    }
}

fn log_general_event(event: &GeneralEvent) {
    match event {
        GeneralEvent::Warning { message, context } => {
            warn!(context = ?context, "{message}");
        }
        GeneralEvent::Error { message, details } => {
            error!(details = ?details, "{message}");
        }
        GeneralEvent::DebugLog { message, context } => {
            debug!(context = ?context, "{message}");
        }
        GeneralEvent::Deprecation { subject, message } => {
            warn!(subject = %subject, "{message}");
        }
        GeneralEvent::OperationStarted { operation } => {
            info!(operation = %operation, "Operation started");
        }
        GeneralEvent::OperationCompleted { operation, success } => {
            info!(operation = %operation, success = success, "Operation completed");
        }
        GeneralEvent::OperationFailed { operation, error } => {
            error!(operation = %operation, error = %error, "Operation failed");
        }
    }
}
