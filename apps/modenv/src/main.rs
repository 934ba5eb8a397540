//! modenv - compose and activate module-based environments
//!
//! Resolves environments from configuration and drives them through the
//! environment engine: printing them, emitting their shell commands, or
//! running a command inside them.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::{Cli, Commands, GlobalArgs};
use crate::display::{CommandResult, EnvironmentView, OutputRenderer};
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use modenv_config::Config;
use modenv_environ::{runtime, ConfiguredEnvironment, Runtime, SavedEnvironment};
use modenv_events::EventSender;
use modenv_platform::{
    EnvStore, NativeProcessOperations, PlatformCommand, ProcessEnv, ProcessOperations,
};
use modenv_types::OutputFormat;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    match run(cli).await {
        Ok(0) => {}
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("Application error: {}", e);
            if !json_mode {
                eprintln!("Error: {e}");
            }
            process::exit(1);
        }
    }
}

/// Main application logic, returning the process exit code
async fn run(cli: Cli) -> Result<i32, CliError> {
    info!("Starting modenv v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration with proper precedence:
    // 1. Start with file config (or defaults)
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;

    // 2. Merge environment variables
    config.merge_env()?;

    // 3. Apply CLI flags (highest precedence)
    apply_cli_config(&mut config, &cli.global)?;

    let json = cli.global.json || config.general.default_output == OutputFormat::Json;

    let (event_sender, mut event_receiver) = modenv_events::channel();
    let mut event_handler = EventHandler::new(json);

    // The engine is synchronous; events queue up and are drained afterwards
    let result = execute_command(cli.command, &config, event_sender);
    event_handler.drain(&mut event_receiver);
    let result = result?;

    OutputRenderer::new(json).render_result(&result)?;

    debug!(notices = event_handler.notices_shown(), "Command completed");
    Ok(result.exit_code())
}

/// Apply CLI flags on top of file and environment configuration
fn apply_cli_config(config: &mut Config, global: &GlobalArgs) -> Result<(), CliError> {
    if let Some(system) = &global.system {
        if system.trim().is_empty() {
            return Err(CliError::InvalidArguments(
                "--system must not be empty".to_string(),
            ));
        }
        config.general.system.clone_from(system);
    }
    if let Some(kind) = global.modules_system {
        config.modules.system = kind;
    }
    Ok(())
}

/// Build the process-wide runtime over the real process environment
fn init_runtime(config: &Config, events: EventSender) -> Result<&'static Runtime, CliError> {
    let env: Arc<dyn EnvStore> = Arc::new(ProcessEnv::new());
    let ops: Arc<dyn ProcessOperations> = Arc::new(NativeProcessOperations::new());
    let modules = modenv_modules::from_kind(config.modules.system, Arc::clone(&env), ops)?;
    debug!(modules = modules.name(), "Initialising runtime");
    Ok(runtime::init(
        Runtime::new(modules, env).with_event_sender(events),
    )?)
}

/// Execute the specified command
fn execute_command(
    command: Commands,
    config: &Config,
    events: EventSender,
) -> Result<CommandResult, CliError> {
    let system = config.system();

    match command {
        Commands::List => Ok(CommandResult::EnvironmentList {
            system: system.to_string(),
            environments: config
                .environment_names(system)
                .into_iter()
                .map(str::to_string)
                .collect(),
        }),

        Commands::Show { name } => {
            let env = ConfiguredEnvironment::resolve(config, &name, system)?;
            Ok(CommandResult::Environment(EnvironmentView::from(&env)))
        }

        Commands::Emit { name, unload } => {
            let env = ConfiguredEnvironment::resolve(config, &name, system)?;
            let rt = init_runtime(config, events)?;
            let commands = if unload {
                env.emit_unload_commands(rt)
            } else {
                env.emit_load_commands(rt)
            };
            Ok(CommandResult::Commands {
                environment: name,
                unload,
                commands,
            })
        }

        Commands::Script { names } => {
            let envs = names
                .iter()
                .map(|name| ConfiguredEnvironment::resolve(config, name, system))
                .collect::<Result<Vec<_>, _>>()?;
            let rt = init_runtime(config, events)?;
            let lines = envs
                .iter()
                .flat_map(|env| env.emit_load_commands(rt))
                .collect();
            Ok(CommandResult::Script {
                environments: names,
                lines,
            })
        }

        Commands::Run { name, command } => {
            let mut env = ConfiguredEnvironment::resolve(config, &name, system)?;
            let rt = init_runtime(config, events)?;
            run_in_environment(&mut env, command, rt)
        }
    }
}

/// Load `env`, run `command` with the resulting variables, then put
/// everything back
fn run_in_environment(
    env: &mut ConfiguredEnvironment,
    command: Vec<String>,
    rt: &Runtime,
) -> Result<CommandResult, CliError> {
    let Some((program, args)) = command.split_first() else {
        return Err(CliError::InvalidArguments(
            "no command given to run".to_string(),
        ));
    };

    // Restores the variables on every exit path, including a failed load
    let saved = SavedEnvironment::new(rt)?;
    env.load(rt)?;

    let mut cmd = PlatformCommand::new(program);
    cmd.args(args).env_exact(rt.env().vars());
    info!(environment = %env.name(), command = %cmd.display(), "Running command");
    let output = NativeProcessOperations::new().execute_command(&cmd);

    env.unload(rt)?;
    saved.restore()?;

    let output = output.map_err(modenv_errors::Error::from)?;
    Ok(CommandResult::Run {
        environment: env.name().to_string(),
        command,
        exit_code: output.status.code(),
        stdout: output.stdout_str(),
        stderr: output.stderr_str(),
    })
}

/// Directory for debug log files
fn log_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("modenv").join("logs"))
}

fn init_tracing(json_mode: bool, debug_enabled_flag: bool) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new("info,modenv=debug,modenv_environ=debug")
        })
    };

    if debug_enabled {
        // Debug mode: structured JSON logs to file
        if let Some(file) = create_log_file(json_mode) {
            tracing_subscriber::fmt()
                .json()
                .with_writer(file)
                .with_env_filter(filter())
                .init();
            return;
        }
        if !json_mode {
            // Fallback to stderr
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter())
                .init();
            return;
        }
    }

    if json_mode {
        // JSON mode: suppress all console output to avoid contaminating JSON
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        // Normal mode: only warnings and errors reach the terminal
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .with_env_filter("warn")
            .init();
    }
}

fn create_log_file(json_mode: bool) -> Option<std::fs::File> {
    let dir = log_dir()?;
    if let Err(e) = std::fs::create_dir_all(&dir) {
        if !json_mode {
            eprintln!("Warning: Failed to create log directory: {e}");
        }
        return None;
    }

    let path = dir.join(format!(
        "modenv-{}.log",
        chrono::Utc::now().format("%Y%m%d-%H%M%S")
    ));
    match std::fs::File::create(&path) {
        Ok(file) => {
            if !json_mode {
                eprintln!("Debug logging enabled: {}", path.display());
            }
            Some(file)
        }
        Err(e) => {
            if !json_mode {
                eprintln!("Warning: Failed to create log file: {e}");
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags_override_config() {
        let cli = Cli::try_parse_from([
            "modenv",
            "--system",
            "daint",
            "--modules-system",
            "lmod",
            "list",
        ])
        .unwrap();
        let mut config = Config::default();
        apply_cli_config(&mut config, &cli.global).unwrap();

        assert_eq!(config.system(), "daint");
        assert_eq!(
            config.modules.system,
            modenv_types::ModuleSystemKind::Lmod
        );
    }

    #[test]
    fn test_unknown_modules_system_rejected() {
        let err = Cli::try_parse_from(["modenv", "--modules-system", "spack", "list"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn test_empty_system_flag_rejected() {
        let cli = Cli::try_parse_from(["modenv", "--system", " ", "list"]).unwrap();
        let mut config = Config::default();
        assert!(matches!(
            apply_cli_config(&mut config, &cli.global),
            Err(CliError::InvalidArguments(_))
        ));
    }

    #[test]
    fn test_list_uses_system_scope() {
        let config = Config::from_toml(
            r#"
[environments.daint.gnu]
modules = ["PrgEnv-gnu"]

[environments."*".builtin]
modules = []
"#,
        )
        .unwrap();
        let mut config = config;
        config.general.system = "daint".to_string();
        let (tx, _rx) = modenv_events::channel();

        let result = execute_command(Commands::List, &config, tx).unwrap();
        match result {
            CommandResult::EnvironmentList {
                system,
                environments,
            } => {
                assert_eq!(system, "daint");
                assert_eq!(environments, ["gnu", "builtin"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_show_unknown_environment_fails() {
        let config = Config::default();
        let (tx, _rx) = modenv_events::channel();
        let err = execute_command(
            Commands::Show {
                name: "missing".to_string(),
            },
            &config,
            tx,
        )
        .unwrap_err();
        assert!(err.to_string().contains("missing"));
    }
}
