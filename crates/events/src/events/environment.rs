use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Environment activation lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EnvironmentEvent {
    /// Environment activation started
    Loading { name: String, modules: Vec<String> },

    /// Environment is active
    Loaded {
        name: String,
        preloaded: Vec<String>,
        conflicted: Vec<String>,
        variables_set: usize,
    },

    /// Environment was deactivated
    Unloaded {
        name: String,
        variables_restored: usize,
        modules_reloaded: Vec<String>,
    },

    /// A whole-environment snapshot was captured
    SnapshotCaptured {
        name: String,
        modules: usize,
        variables: usize,
    },

    /// A whole-environment snapshot was written back
    SnapshotRestored { name: String, variables: usize },

    /// Restoring a saved environment at scope exit failed
    RestoreFailed {
        name: String,
        failure: FailureContext,
    },
}

/// Module system operations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ModuleEvent {
    /// A module was loaded
    Loaded { system: String, module: String },

    /// A module was unloaded
    Unloaded { system: String, module: String },

    /// Loading a module forced other modules out
    ConflictResolved {
        system: String,
        module: String,
        unloaded: Vec<String>,
    },
}
