//! Integration tests for events

#[cfg(test)]
mod tests {
    use modenv_errors::EnvironmentError;
    use modenv_events::*;

    #[tokio::test]
    async fn test_event_sender_emit() {
        let (tx, mut rx) = channel();

        tx.emit_error("test error");
        tx.emit_deprecation("cc", "setting this field is deprecated");

        let event1 = rx.recv().await.unwrap();
        assert!(matches!(event1, AppEvent::General(GeneralEvent::Error { .. })));

        let event2 = rx.recv().await.unwrap();
        assert!(matches!(
            event2,
            AppEvent::General(GeneralEvent::Deprecation { .. })
        ));
        assert_eq!(event2.log_level(), tracing::Level::WARN);
    }

    #[tokio::test]
    async fn test_dropped_receiver() {
        let (tx, rx) = channel();
        drop(rx);

        // Should not panic when receiver is dropped
        tx.emit_warning("ignored");
    }

    #[test]
    fn test_failure_context_from_error() {
        let err = EnvironmentError::AlreadyLoaded {
            name: "gcc-env".into(),
        };
        let failure = FailureContext::from_error(&err);
        assert_eq!(failure.code.as_deref(), Some("environment.already_loaded"));
        assert!(failure.hint.is_some());
        assert!(!failure.retryable);
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = AppEvent::Module(ModuleEvent::Loaded {
            system: "lmod".into(),
            module: "gcc/7.3.0".into(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["domain"], "module");
        assert_eq!(json["event"]["type"], "Loaded");
        assert_eq!(event.log_target(), "modenv::events::module");
    }
}
