//! Module systems driven through an external tool
//!
//! Both Environment Modules (`modulecmd`) and Lmod (`$LMOD_CMD`) print shell
//! code for the caller to evaluate. The tool is run with the ambient
//! environment of the [`EnvStore`] and its `sh` output is applied back to the
//! same store, which keeps `LOADEDMODULES` and friends consistent.

mod parse;

pub use parse::{parse_shell_output, ShellAction};

use modenv_errors::{Error, ModuleError};
use modenv_platform::{EnvStore, PlatformCommand, ProcessOperations};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{module_matches, ModuleBackend};

/// Which module tool drives a [`ShellModules`] backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellFlavor {
    Tmod,
    Lmod,
}

impl ShellFlavor {
    fn name(self) -> &'static str {
        match self {
            Self::Tmod => "tmod",
            Self::Lmod => "lmod",
        }
    }
}

/// Module system backed by `modulecmd` or Lmod
pub struct ShellModules {
    flavor: ShellFlavor,
    program: PathBuf,
    env: Arc<dyn EnvStore>,
    ops: Arc<dyn ProcessOperations>,
}

impl std::fmt::Debug for ShellModules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellModules")
            .field("flavor", &self.flavor)
            .field("program", &self.program)
            .finish_non_exhaustive()
    }
}

impl ShellModules {
    /// Environment Modules, located as `modulecmd` on `PATH`
    ///
    /// # Errors
    ///
    /// Returns an error if `modulecmd` cannot be found.
    pub fn tmod(env: Arc<dyn EnvStore>, ops: Arc<dyn ProcessOperations>) -> Result<Self, Error> {
        let program = ops.which("modulecmd").map_err(ModuleError::from)?;
        Ok(Self::with_program(ShellFlavor::Tmod, program, env, ops))
    }

    /// Lmod, located through the `LMOD_CMD` variable it exports
    ///
    /// # Errors
    ///
    /// Returns an error if `LMOD_CMD` is not set.
    pub fn lmod(env: Arc<dyn EnvStore>, ops: Arc<dyn ProcessOperations>) -> Result<Self, Error> {
        let program = env
            .get("LMOD_CMD")
            .ok_or_else(|| ModuleError::SystemUnavailable {
                system: "lmod".to_string(),
                message: "LMOD_CMD is not set".to_string(),
            })?;
        Ok(Self::with_program(
            ShellFlavor::Lmod,
            PathBuf::from(program),
            env,
            ops,
        ))
    }

    /// Use an explicit tool path
    #[must_use]
    pub fn with_program(
        flavor: ShellFlavor,
        program: PathBuf,
        env: Arc<dyn EnvStore>,
        ops: Arc<dyn ProcessOperations>,
    ) -> Self {
        Self {
            flavor,
            program,
            env,
            ops,
        }
    }

    /// Which tool drives this backend
    #[must_use]
    pub fn flavor(&self) -> ShellFlavor {
        self.flavor
    }

    /// Run `<tool> sh <args>` and return (stdout, stderr)
    fn run(&self, args: &[&str]) -> Result<(String, String), Error> {
        let mut cmd = PlatformCommand::new(&self.program.to_string_lossy());
        cmd.arg("sh").args(args).env_exact(self.env.vars());

        let output = self
            .ops
            .execute_command(&cmd)
            .map_err(ModuleError::from)?;
        let stdout = output.stdout_str();
        let stderr = output.stderr_str();

        if let Some(missing) = unknown_module(&stderr) {
            return Err(ModuleError::NotFound { name: missing }.into());
        }
        if !output.status.success() || has_error(&stderr) {
            return Err(ModuleError::CommandFailed {
                command: cmd.display(),
                message: stderr.trim().to_string(),
            }
            .into());
        }
        Ok((stdout, stderr))
    }

    /// Run a state-changing subcommand and apply its output to the store
    fn execute(&self, args: &[&str]) -> Result<(), Error> {
        let (stdout, _) = self.run(args)?;
        for action in parse_shell_output(&stdout) {
            match action {
                ShellAction::Set { name, value } => self.env.set(&name, &value)?,
                ShellAction::Unset { name } => self.env.remove(&name),
            }
        }
        Ok(())
    }

    /// Modules declared as conflicting in `module show` output
    fn declared_conflicts(&self, module: &str) -> Result<Vec<String>, Error> {
        let (stdout, stderr) = self.run(&["show", module])?;
        Ok(stdout
            .lines()
            .chain(stderr.lines())
            .filter_map(|line| line.trim().strip_prefix("conflict"))
            .flat_map(str::split_whitespace)
            .map(ToString::to_string)
            .collect())
    }
}

/// Name of the module a tool reported as unknown, if any
fn unknown_module(stderr: &str) -> Option<String> {
    for line in stderr.lines() {
        // modulecmd: "Unable to locate a modulefile for 'foo'"
        if let Some(rest) = line.split("Unable to locate a modulefile for").nth(1) {
            return Some(rest.trim().trim_matches(|c| c == '\'' || c == '"').to_string());
        }
        // Lmod: "The following module(s) are unknown: "foo""
        if let Some(rest) = line.split("are unknown:").nth(1) {
            return Some(rest.trim().trim_matches(|c| c == '\'' || c == '"').to_string());
        }
    }
    None
}

fn has_error(stderr: &str) -> bool {
    stderr
        .lines()
        .any(|line| line.contains(":ERROR:") || line.contains("Lmod has detected the following error"))
}

impl ModuleBackend for ShellModules {
    fn name(&self) -> &str {
        self.flavor.name()
    }

    fn is_loaded(&self, module: &str) -> Result<bool, Error> {
        Ok(self
            .loaded_modules()?
            .iter()
            .any(|loaded| module_matches(module, loaded)))
    }

    fn load(&self, module: &str, force: bool) -> Result<Vec<String>, Error> {
        let before = self.loaded_modules()?;
        let mut forced = Vec::new();

        if force && self.flavor == ShellFlavor::Tmod {
            // modulecmd refuses conflicting loads, so clear the way first
            for pattern in self.declared_conflicts(module)? {
                for loaded in before.iter().filter(|m| module_matches(&pattern, m)) {
                    if !module_matches(module, loaded) && !forced.contains(loaded) {
                        self.execute(&["unload", loaded.as_str()])?;
                        forced.push(loaded.clone());
                    }
                }
            }
        }

        self.execute(&["load", module])?;

        if force {
            // Lmod swaps family members on its own; pick those up too
            let after = self.loaded_modules()?;
            for gone in before
                .into_iter()
                .filter(|m| !after.contains(m) && !module_matches(module, m))
            {
                if !forced.contains(&gone) {
                    forced.push(gone);
                }
            }
        }

        if !forced.is_empty() {
            warn!(module, unloaded = ?forced, "module load forced conflicting modules out");
        }
        debug!(system = self.name(), module, "module loaded");
        Ok(forced)
    }

    fn unload(&self, module: &str) -> Result<(), Error> {
        self.execute(&["unload", module])?;
        debug!(system = self.name(), module, "module unloaded");
        Ok(())
    }

    fn loaded_modules(&self) -> Result<Vec<String>, Error> {
        Ok(self
            .env
            .get("LOADEDMODULES")
            .map(|value| {
                value
                    .split(':')
                    .filter(|m| !m.is_empty())
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }

    fn emit_load_commands(&self, module: &str) -> Vec<String> {
        vec![format!("module load {module}")]
    }

    fn emit_unload_commands(&self, module: &str) -> Vec<String> {
        vec![format!("module unload {module}")]
    }
}
