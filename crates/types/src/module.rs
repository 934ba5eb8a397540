//! Module system types

use serde::{Deserialize, Serialize};

/// Supported module system flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModuleSystemKind {
    /// No module system; module operations are no-ops
    #[default]
    Nomod,
    /// Environment Modules (Tcl) driven through `modulecmd`
    Tmod,
    /// Lmod driven through `$LMOD_CMD`
    Lmod,
}

impl ModuleSystemKind {
    /// Name used in configuration files and logs
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nomod => "nomod",
            Self::Tmod => "tmod",
            Self::Lmod => "lmod",
        }
    }
}

impl std::fmt::Display for ModuleSystemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ModuleSystemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nomod" => Ok(Self::Nomod),
            "tmod" => Ok(Self::Tmod),
            "lmod" => Ok(Self::Lmod),
            other => Err(other.to_string()),
        }
    }
}

/// A single module operation recorded while loading an environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleOp {
    Load,
    Unload,
}

impl ModuleOp {
    /// The opposite operation, used when reversing a log
    #[must_use]
    pub fn inverse(self) -> Self {
        match self {
            Self::Load => Self::Unload,
            Self::Unload => Self::Load,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in [ModuleSystemKind::Nomod, ModuleSystemKind::Tmod, ModuleSystemKind::Lmod] {
            assert_eq!(kind.as_str().parse::<ModuleSystemKind>(), Ok(kind));
        }
        assert!("spack".parse::<ModuleSystemKind>().is_err());
    }

    #[test]
    fn test_kind_serde_lowercase() {
        let json = serde_json::to_string(&ModuleSystemKind::Lmod).unwrap();
        assert_eq!(json, r#""lmod""#);
    }

    #[test]
    fn test_op_inverse() {
        assert_eq!(ModuleOp::Load.inverse(), ModuleOp::Unload);
        assert_eq!(ModuleOp::Unload.inverse().inverse(), ModuleOp::Unload);
    }
}
