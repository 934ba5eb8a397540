//! Integration tests for the modenv CLI

use std::path::Path;
use std::process::{Command, Output};

const CONFIG: &str = r#"
[general]
system = "generic"

[modules]
system = "nomod"

[environments.generic.builtin]
modules = ["gcc"]
variables = { CC = "gcc", CFLAGS = "-O2 $CC" }

[environments.generic.gnu]
type = "ProgEnvironment"
modules = ["PrgEnv-gnu"]
cc = "gcc"
ftn = "gfortran"

[environments."*".fallback]
variables = { FALLBACK = "yes" }
"#;

fn modenv(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_modenv"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("MODENV_SYSTEM")
        .env_remove("MODENV_MODULES_SYSTEM")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute modenv")
}

fn write_config(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, CONFIG).unwrap();
    path
}

#[test]
fn test_cli_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_modenv"))
        .arg("--version")
        .output()
        .expect("Failed to execute modenv");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("modenv"));
}

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_modenv"))
        .arg("--help")
        .output()
        .expect("Failed to execute modenv");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Compose and activate module-based environments"));
    assert!(stdout.contains("list"));
    assert!(stdout.contains("emit"));
    assert!(stdout.contains("run"));
}

#[test]
fn test_cli_invalid_command() {
    let output = Command::new(env!("CARGO_BIN_EXE_modenv"))
        .arg("invalid-command")
        .output()
        .expect("Failed to execute modenv");

    assert!(!output.status.success());
}

#[test]
fn test_list_includes_fallback_scope() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir);

    let output = modenv(&config, &["list"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.lines().collect::<Vec<_>>(),
        ["builtin", "gnu", "fallback"]
    );
}

#[test]
fn test_show_json() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir);

    let output = modenv(&config, &["--json", "show", "gnu"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["type"], "environment");
    assert_eq!(json["data"]["kind"], "ProgEnvironment");
    assert_eq!(json["data"]["toolchain"]["ftn"], "gfortran");
    assert_eq!(json["data"]["toolchain"]["cxx"], "CC");
}

#[test]
fn test_show_unknown_environment_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir);

    let output = modenv(&config, &["show", "missing"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown environment 'missing'"));
}

#[test]
fn test_emit_without_module_system_exports_variables() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir);

    let output = modenv(&config, &["emit", "builtin"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "export CC=gcc\nexport CFLAGS=-O2 $CC\n"
    );

    let output = modenv(&config, &["emit", "--unload", "builtin"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "unset CC\nunset CFLAGS\n"
    );
}

#[test]
fn test_script_preamble() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir);

    let output = modenv(&config, &["script", "builtin", "fallback"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("#!/bin/bash\n# environments: builtin fallback\n"));
}

#[cfg(unix)]
#[test]
fn test_run_sees_expanded_variables() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir);

    let output = modenv(
        &config,
        &[
            "--json",
            "run",
            "builtin",
            "--",
            "sh",
            "-c",
            "printf '%s|%s' \"$CC\" \"$CFLAGS\"",
        ],
    );
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["type"], "run");
    assert_eq!(json["data"]["stdout"], "gcc|-O2 gcc");
    assert_eq!(json["data"]["exit_code"], 0);
}

#[cfg(unix)]
#[test]
fn test_run_propagates_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir);

    let output = modenv(&config, &["run", "fallback", "--", "sh", "-c", "exit 3"]);
    assert_eq!(output.status.code(), Some(3));
}
