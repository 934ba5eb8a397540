//! Integration tests for config

#[cfg(test)]
mod tests {
    use modenv_config::*;
    use modenv_errors::{ConfigError, Error};
    use modenv_types::{EnvironmentKind, ModuleSystemKind, OutputFormat};
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    const SAMPLE: &str = r#"
[general]
system = "daint"
default_output = "json"

[modules]
system = "lmod"

[environments."*".builtin]
modules = []
[environments."*".builtin.variables]
ZVAR = "last"
AVAR = "first"
MVAR = "$AVAR/middle"

[environments."*".PrgEnv-gnu]
type = "ProgEnvironment"
modules = ["PrgEnv-gnu"]
cc = "gcc"
cxx = "g++"
ftn = "gfortran"

[environments.daint.PrgEnv-gnu]
type = "ProgEnvironment"
modules = ["PrgEnv-gnu", "craype-haswell"]
cc = "cc"
cflags = "-O2"
propagate = false
"#;

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{SAMPLE}").unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.system(), "daint");
        assert_eq!(config.general.default_output, OutputFormat::Json);
        assert_eq!(config.modules.system, ModuleSystemKind::Lmod);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_or_default(Some(dir.path().join("absent.toml").as_path()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_variables_keep_file_order() {
        let config = Config::from_toml(SAMPLE).unwrap();
        let builtin = config.environment("builtin", "daint").unwrap();
        let keys: Vec<_> = builtin.variables.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["ZVAR", "AVAR", "MVAR"]);
        assert_eq!(builtin.variables["MVAR"], "$AVAR/middle");
    }

    #[test]
    fn test_system_scope_shadows_wildcard() {
        let config = Config::from_toml(SAMPLE).unwrap();

        let daint = config.environment("PrgEnv-gnu", "daint").unwrap();
        assert_eq!(daint.kind, EnvironmentKind::ProgEnvironment);
        assert_eq!(daint.modules, vec!["PrgEnv-gnu", "craype-haswell"]);
        assert_eq!(daint.cflags.as_deref(), Some("-O2"));
        assert!(!daint.propagate);

        let other = config.environment("PrgEnv-gnu", "dom").unwrap();
        assert_eq!(other.cc.as_deref(), Some("gcc"));
        assert!(other.propagate);
    }

    #[test]
    fn test_unknown_environment() {
        let config = Config::from_toml(SAMPLE).unwrap();
        let err = config.environment("PrgEnv-cray", "daint").unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::UnknownEnvironment { ref name, .. }) if name == "PrgEnv-cray"
        ));
    }

    #[test]
    fn test_environment_names_are_deduplicated() {
        let config = Config::from_toml(SAMPLE).unwrap();
        assert_eq!(config.environment_names("daint"), vec!["PrgEnv-gnu", "builtin"]);
        assert_eq!(config.environment_names("dom"), vec!["builtin", "PrgEnv-gnu"]);
        assert_eq!(config.environment_names(ANY_SYSTEM), vec!["builtin", "PrgEnv-gnu"]);
    }

    #[test]
    fn test_lookups_outlive_system_name() {
        let config = Config::from_toml(SAMPLE).unwrap();
        let (found, names) = {
            let system = String::from("daint");
            (
                config.environment("PrgEnv-gnu", &system).unwrap(),
                config.environment_names(&system),
            )
        };
        assert_eq!(found.cc.as_deref(), Some("cc"));
        assert_eq!(names, vec!["PrgEnv-gnu", "builtin"]);
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::set_var("MODENV_SYSTEM", "dom");
        std::env::set_var("MODENV_MODULES_SYSTEM", "tmod");

        let mut config = Config::default();
        config.merge_env().unwrap();

        assert_eq!(config.system(), "dom");
        assert_eq!(config.modules.system, ModuleSystemKind::Tmod);

        // Clean up
        std::env::remove_var("MODENV_SYSTEM");
        std::env::remove_var("MODENV_MODULES_SYSTEM");
    }

    #[test]
    fn test_invalid_env_value() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::remove_var("MODENV_SYSTEM");
        std::env::set_var("MODENV_MODULES_SYSTEM", "spack");

        let mut config = Config::default();
        let err = config.merge_env().unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::UnknownModuleSystem { .. })
        ));

        // Clean up
        std::env::remove_var("MODENV_MODULES_SYSTEM");
    }
}
