//! Output rendering and formatting

use indexmap::IndexMap;
use modenv_environ::{ConfiguredEnvironment, ProgEnvironment};
use serde::Serialize;
use std::io::{self, Write};

/// Outcome of a command, ready to render
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum CommandResult {
    /// Environments defined for a system
    EnvironmentList {
        system: String,
        environments: Vec<String>,
    },
    /// One environment in full
    Environment(EnvironmentView),
    /// Shell commands for one environment
    Commands {
        environment: String,
        unload: bool,
        commands: Vec<String>,
    },
    /// Job script preamble for several environments
    Script {
        environments: Vec<String>,
        lines: Vec<String>,
    },
    /// A command run inside an environment
    Run {
        environment: String,
        command: Vec<String>,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

impl CommandResult {
    /// Process exit code the CLI should finish with
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Run { exit_code, .. } => exit_code.unwrap_or(1),
            _ => 0,
        }
    }
}

/// Serializable description of a configured environment
#[derive(Debug, Serialize)]
pub struct EnvironmentView {
    pub name: String,
    pub kind: String,
    pub modules: Vec<String>,
    pub variables: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolchain: Option<ToolchainView>,
    #[serde(skip)]
    details: String,
}

#[derive(Debug, Serialize)]
pub struct ToolchainView {
    pub cc: String,
    pub cxx: Option<String>,
    pub ftn: Option<String>,
    pub nvcc: String,
    pub cppflags: Option<String>,
    pub cflags: Option<String>,
    pub cxxflags: Option<String>,
    pub fflags: Option<String>,
    pub ldflags: Option<String>,
    pub include_search_path: Vec<String>,
    pub propagate: bool,
}

impl From<&ConfiguredEnvironment> for EnvironmentView {
    fn from(env: &ConfiguredEnvironment) -> Self {
        Self {
            name: env.name().to_string(),
            kind: env.kind().to_string(),
            modules: env.modules().to_vec(),
            variables: env.variables().clone(),
            toolchain: env.as_prog().map(ToolchainView::from),
            details: env.details(),
        }
    }
}

impl From<&ProgEnvironment> for ToolchainView {
    fn from(prog: &ProgEnvironment) -> Self {
        Self {
            cc: prog.cc().to_string(),
            cxx: prog.cxx().map(str::to_string),
            ftn: prog.ftn().map(str::to_string),
            nvcc: prog.nvcc().to_string(),
            cppflags: prog.cppflags().map(str::to_string),
            cflags: prog.cflags().map(str::to_string),
            cxxflags: prog.cxxflags().map(str::to_string),
            fflags: prog.fflags().map(str::to_string),
            ldflags: prog.ldflags().map(str::to_string),
            include_search_path: prog.include_search_path().to_vec(),
            propagate: prog.propagate(),
        }
    }
}

/// Output renderer for CLI results
#[derive(Debug, Clone, Copy)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
}

impl OutputRenderer {
    pub fn new(json_output: bool) -> Self {
        Self { json_output }
    }

    /// Render a command result to stdout
    pub fn render_result(&self, result: &CommandResult) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if self.json_output {
            let json = serde_json::to_string_pretty(result).map_err(io::Error::other)?;
            writeln!(out, "{json}")
        } else {
            self.render_plain(result, &mut out)
        }
    }

    /// Render as human readable text
    pub fn render_plain(&self, result: &CommandResult, out: &mut impl Write) -> io::Result<()> {
        match result {
            CommandResult::EnvironmentList {
                system,
                environments,
            } => {
                if environments.is_empty() {
                    writeln!(out, "No environments defined for system '{system}'")?;
                }
                for name in environments {
                    writeln!(out, "{name}")?;
                }
            }
            CommandResult::Environment(view) => {
                writeln!(out, "{}", view.details)?;
                writeln!(out, "    type: {}", view.kind)?;
                if let Some(toolchain) = &view.toolchain {
                    render_toolchain(toolchain, out)?;
                }
            }
            CommandResult::Commands { commands, .. } => {
                for command in commands {
                    writeln!(out, "{command}")?;
                }
            }
            CommandResult::Script {
                environments,
                lines,
            } => {
                writeln!(out, "#!/bin/bash")?;
                writeln!(out, "# environments: {}", environments.join(" "))?;
                for line in lines {
                    writeln!(out, "{line}")?;
                }
            }
            CommandResult::Run { stdout, stderr, .. } => {
                write!(out, "{stdout}")?;
                eprint!("{stderr}");
            }
        }
        Ok(())
    }
}

fn render_toolchain(toolchain: &ToolchainView, out: &mut impl Write) -> io::Result<()> {
    let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    writeln!(out, "    toolchain:")?;
    writeln!(out, "        cc: {}", toolchain.cc)?;
    writeln!(out, "        cxx: {}", optional(&toolchain.cxx))?;
    writeln!(out, "        ftn: {}", optional(&toolchain.ftn))?;
    writeln!(out, "        nvcc: {}", toolchain.nvcc)?;
    writeln!(out, "        cppflags: {}", optional(&toolchain.cppflags))?;
    writeln!(out, "        cflags: {}", optional(&toolchain.cflags))?;
    writeln!(out, "        cxxflags: {}", optional(&toolchain.cxxflags))?;
    writeln!(out, "        fflags: {}", optional(&toolchain.fflags))?;
    writeln!(out, "        ldflags: {}", optional(&toolchain.ldflags))?;
    writeln!(
        out,
        "        include_search_path: {}",
        toolchain.include_search_path.join(":")
    )?;
    writeln!(out, "        propagate: {}", toolchain.propagate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use modenv_config::Config;

    const CONFIG: &str = r#"
[environments.generic.builtin]
modules = ["gcc"]
variables = { CC = "gcc" }

[environments.generic.gnu]
type = "ProgEnvironment"
modules = ["PrgEnv-gnu"]
cc = "gcc"
cflags = "-O2"
"#;

    fn render(result: &CommandResult) -> String {
        let mut buf = Vec::new();
        OutputRenderer::new(false)
            .render_plain(result, &mut buf)
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_plain_environment_has_no_toolchain_section() {
        let config = Config::from_toml(CONFIG).unwrap();
        let env = ConfiguredEnvironment::resolve(&config, "builtin", "generic").unwrap();
        let text = render(&CommandResult::Environment(EnvironmentView::from(&env)));

        assert!(text.starts_with("builtin:\n    modules: gcc"));
        assert!(text.contains("- CC=gcc"));
        assert!(text.contains("type: Environment"));
        assert!(!text.contains("toolchain"));
    }

    #[test]
    fn test_prog_environment_shows_toolchain() {
        let config = Config::from_toml(CONFIG).unwrap();
        let env = ConfiguredEnvironment::resolve(&config, "gnu", "generic").unwrap();
        let view = EnvironmentView::from(&env);
        let text = render(&CommandResult::Environment(view));

        assert!(text.contains("type: ProgEnvironment"));
        assert!(text.contains("cc: gcc"));
        assert!(text.contains("cflags: -O2"));
        assert!(text.contains("ldflags: -"));
    }

    #[test]
    fn test_json_view_skips_details() {
        let config = Config::from_toml(CONFIG).unwrap();
        let env = ConfiguredEnvironment::resolve(&config, "builtin", "generic").unwrap();
        let json = serde_json::to_value(CommandResult::Environment(EnvironmentView::from(&env)))
            .unwrap();

        assert_eq!(json["type"], "environment");
        assert_eq!(json["data"]["name"], "builtin");
        assert_eq!(json["data"]["variables"]["CC"], "gcc");
        assert!(json["data"].get("details").is_none());
        assert!(json["data"].get("toolchain").is_none());
    }

    #[test]
    fn test_script_has_shebang() {
        let text = render(&CommandResult::Script {
            environments: vec!["a".to_string(), "b".to_string()],
            lines: vec!["module load gcc".to_string()],
        });
        assert_eq!(text, "#!/bin/bash\n# environments: a b\nmodule load gcc\n");
    }

    #[test]
    fn test_run_exit_code_defaults_to_failure_on_signal() {
        let result = CommandResult::Run {
            environment: "builtin".to_string(),
            command: vec!["true".to_string()],
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
        };
        assert_eq!(result.exit_code(), 1);
    }
}
