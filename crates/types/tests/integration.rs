//! Integration tests for types

#[cfg(test)]
mod tests {
    use modenv_types::*;

    #[test]
    fn test_environment_kind_uses_class_names() {
        assert_eq!(EnvironmentKind::default(), EnvironmentKind::Environment);
        assert_eq!(
            serde_json::to_string(&EnvironmentKind::ProgEnvironment).unwrap(),
            r#""ProgEnvironment""#
        );
        let kind: EnvironmentKind = serde_json::from_str(r#""Environment""#).unwrap();
        assert_eq!(kind, EnvironmentKind::Environment);
        assert_eq!(EnvironmentKind::ProgEnvironment.to_string(), "ProgEnvironment");
    }

    #[test]
    fn test_unknown_environment_kind_rejected() {
        assert!(serde_json::from_str::<EnvironmentKind>(r#""SnapshotEnvironment""#).is_err());
    }

    #[test]
    fn test_output_format_lowercase() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
        let format: OutputFormat = serde_json::from_str(r#""json""#).unwrap();
        assert_eq!(format, OutputFormat::Json);
    }

    #[test]
    fn test_module_system_display_matches_parse() {
        let kind: ModuleSystemKind = "tmod".parse().unwrap();
        assert_eq!(kind.to_string(), "tmod");
        assert_eq!(ModuleSystemKind::default(), ModuleSystemKind::Nomod);
    }

    #[test]
    fn test_identifier_reexport() {
        assert!(is_valid_identifier("PrgEnv-gnu"));
        assert!(!is_valid_identifier("PrgEnv gnu"));
    }
}
