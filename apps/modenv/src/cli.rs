//! Command line interface definition

use clap::{Parser, Subcommand};
use modenv_types::ModuleSystemKind;
use std::path::PathBuf;

/// modenv - compose and activate module-based environments
#[derive(Debug, Parser)]
#[command(name = "modenv")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compose and activate module-based environments")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Debug, Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Write debug logs to the modenv log directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// System whose environments to use
    #[arg(long, global = true, value_name = "NAME")]
    pub system: Option<String>,

    /// Module system driving loads and unloads
    #[arg(long, global = true, value_name = "KIND", value_enum)]
    pub modules_system: Option<ModuleSystemKind>,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the environments defined for the current system
    #[command(alias = "ls")]
    List,

    /// Show an environment's modules, variables and toolchain
    Show {
        /// Environment name
        name: String,
    },

    /// Print the shell commands that load (or unload) an environment
    Emit {
        /// Environment name
        name: String,

        /// Emit the unload sequence instead
        #[arg(long)]
        unload: bool,
    },

    /// Print a job script preamble loading environments in order
    Script {
        /// Environment names
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Load an environment, run a command inside it, then restore
    Run {
        /// Environment name
        name: String,

        /// Command and arguments
        #[arg(last = true, required = true)]
        command: Vec<String>,
    },
}
