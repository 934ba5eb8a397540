//! Deprecated direct mutation of toolchain fields
//!
//! Toolchain settings belong to the build system now. The setters here still
//! store the value, but every call reports a deprecation notice through
//! `tracing` and, when a sender is attached, as a `Deprecation` event. They
//! never fail.
//!
//! ```ignore
//! prog.legacy(rt.event_sender()).set_cc("gcc").set_cflags(Some("-O2"));
//! ```

use modenv_events::{EventEmitter, EventSender};
use tracing::warn;

use super::ProgEnvironment;

/// Notice reported for every legacy field assignment
pub const DEPRECATION_MESSAGE: &str =
    "setting this field is deprecated; please set it through a build system";

/// Setter proxy returned by [`ProgEnvironment::legacy`]
pub struct Legacy<'a> {
    prog: &'a mut ProgEnvironment,
    events: Option<&'a EventSender>,
}

impl ProgEnvironment {
    /// Mutate toolchain fields the deprecated way
    #[must_use]
    pub fn legacy<'a>(&'a mut self, events: Option<&'a EventSender>) -> Legacy<'a> {
        Legacy { prog: self, events }
    }
}

impl EventEmitter for Legacy<'_> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events
    }
}

impl Legacy<'_> {
    fn deprecated(&self, field: &str) {
        warn!(environment = %self.prog.name(), field, "{DEPRECATION_MESSAGE}");
        self.emit_deprecation(
            format!("{}.{field}", self.prog.name()),
            DEPRECATION_MESSAGE,
        );
    }

    pub fn set_cc(&mut self, cc: impl Into<String>) -> &mut Self {
        self.prog.toolchain.cc = cc.into();
        self.deprecated("cc");
        self
    }

    pub fn set_cxx(&mut self, cxx: Option<&str>) -> &mut Self {
        self.prog.toolchain.cxx = cxx.map(ToString::to_string);
        self.deprecated("cxx");
        self
    }

    pub fn set_ftn(&mut self, ftn: Option<&str>) -> &mut Self {
        self.prog.toolchain.ftn = ftn.map(ToString::to_string);
        self.deprecated("ftn");
        self
    }

    pub fn set_cppflags(&mut self, flags: Option<&str>) -> &mut Self {
        self.prog.toolchain.cppflags = flags.map(ToString::to_string);
        self.deprecated("cppflags");
        self
    }

    pub fn set_cflags(&mut self, flags: Option<&str>) -> &mut Self {
        self.prog.toolchain.cflags = flags.map(ToString::to_string);
        self.deprecated("cflags");
        self
    }

    pub fn set_cxxflags(&mut self, flags: Option<&str>) -> &mut Self {
        self.prog.toolchain.cxxflags = flags.map(ToString::to_string);
        self.deprecated("cxxflags");
        self
    }

    pub fn set_fflags(&mut self, flags: Option<&str>) -> &mut Self {
        self.prog.toolchain.fflags = flags.map(ToString::to_string);
        self.deprecated("fflags");
        self
    }

    pub fn set_ldflags(&mut self, flags: Option<&str>) -> &mut Self {
        self.prog.toolchain.ldflags = flags.map(ToString::to_string);
        self.deprecated("ldflags");
        self
    }

    pub fn set_include_search_path<I, S>(&mut self, paths: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prog.toolchain.include_search_path = paths.into_iter().map(Into::into).collect();
        self.deprecated("include_search_path");
        self
    }

    pub fn set_propagate(&mut self, propagate: bool) -> &mut Self {
        self.prog.toolchain.propagate = propagate;
        self.deprecated("propagate");
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modenv_events::{AppEvent, GeneralEvent};

    fn prog() -> ProgEnvironment {
        let none: [(&str, &str); 0] = [];
        ProgEnvironment::new("PrgEnv-gnu", ["PrgEnv-gnu"], none).unwrap()
    }

    #[test]
    fn test_setters_store_values() {
        let mut prog = prog();
        prog.legacy(None)
            .set_cc("gcc")
            .set_cxx(Some("g++"))
            .set_ftn(None)
            .set_cflags(Some("-O2"))
            .set_include_search_path(["/opt/include"])
            .set_propagate(false);

        assert_eq!(prog.cc(), "gcc");
        assert_eq!(prog.cxx(), Some("g++"));
        assert_eq!(prog.ftn(), None);
        assert_eq!(prog.cflags(), Some("-O2"));
        assert_eq!(prog.include_search_path(), ["/opt/include"]);
        assert!(!prog.propagate());
    }

    #[test]
    fn test_every_setter_reports_deprecation() {
        let (tx, mut rx) = modenv_events::channel();
        let mut prog = prog();
        prog.legacy(Some(&tx))
            .set_ldflags(Some("-lm"))
            .set_fflags(None);

        let mut subjects = Vec::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                AppEvent::General(GeneralEvent::Deprecation { subject, message }) => {
                    assert_eq!(message, DEPRECATION_MESSAGE);
                    subjects.push(subject);
                }
                other => panic!("unexpected event: {other:?}"),
            }
        }
        assert_eq!(subjects, vec!["PrgEnv-gnu.ldflags", "PrgEnv-gnu.fflags"]);
    }

    #[test]
    fn test_toolchain_does_not_affect_equality() {
        let plain = prog();
        let mut changed = prog();
        changed.legacy(None).set_cc("icc");
        assert_eq!(plain, changed);
    }
}
