//! Shell-style variable reference expansion
//!
//! `$NAME` and `${NAME}` are replaced by the current value of `NAME`.
//! `NAME` in the bare form is a run of ASCII letters, digits and `_`; the
//! braced form takes everything up to the closing brace. References to unset
//! variables, and `$` not followed by a name, are kept verbatim.

use modenv_platform::EnvStore;
use regex::{Captures, Regex};
use std::sync::LazyLock;

// Group 1 is the bare name, group 2 the braced one
static REFERENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$([A-Za-z0-9_]+|\{([^}]*)\})").expect("reference pattern is valid")
});

/// Expand references in `value` against `store`
#[must_use]
pub fn expand_vars(value: &str, store: &dyn EnvStore) -> String {
    expand_with(value, |name| store.get(name))
}

/// Expand references in `value`, resolving names with `lookup`
#[must_use]
pub fn expand_with<F>(value: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    REFERENCE_REGEX
        .replace_all(value, |caps: &Captures<'_>| {
            let name = caps.get(2).or_else(|| caps.get(1)).map_or("", |m| m.as_str());
            lookup(name).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "HOME" => Some("/home/user".to_string()),
            "CC" => Some("gcc".to_string()),
            "EMPTY" => Some(String::new()),
            _ => None,
        }
    }

    #[test]
    fn test_bare_and_braced_references() {
        assert_eq!(expand_with("$HOME/bin", lookup), "/home/user/bin");
        assert_eq!(expand_with("${CC}-13", lookup), "gcc-13");
        assert_eq!(expand_with("$CC$CC", lookup), "gccgcc");
        assert_eq!(expand_with("x${EMPTY}y", lookup), "xy");
    }

    #[test]
    fn test_unknown_references_are_kept() {
        assert_eq!(expand_with("$NOPE/bin", lookup), "$NOPE/bin");
        assert_eq!(expand_with("${NOPE}", lookup), "${NOPE}");
        assert_eq!(expand_with("cost: $5", lookup), "cost: $5");
    }

    #[test]
    fn test_lone_and_unterminated_dollars() {
        assert_eq!(expand_with("$", lookup), "$");
        assert_eq!(expand_with("a $ b", lookup), "a $ b");
        assert_eq!(expand_with("${HOME", lookup), "${HOME");
        assert_eq!(expand_with("${}", lookup), "${}");
    }

    #[test]
    fn test_braced_name_runs_to_first_brace() {
        let dashed = |name: &str| (name == "A-B").then(|| "dash".to_string());
        assert_eq!(expand_with("${A-B}", dashed), "dash");
        assert_eq!(expand_with("${CC}}", lookup), "gcc}");
        assert_eq!(expand_with("$A-B", dashed), "$A-B");
    }

    #[test]
    fn test_name_stops_at_non_word_char() {
        assert_eq!(expand_with("$HOME.d", lookup), "/home/user.d");
        assert_eq!(expand_with("$HOMEdir", lookup), "$HOMEdir");
    }

    proptest! {
        #[test]
        fn test_text_without_dollar_is_unchanged(text in "[^$]*") {
            prop_assert_eq!(expand_with(&text, lookup), text);
        }

        #[test]
        fn test_unresolvable_text_is_unchanged(text in "[a-z$ {}/]*") {
            prop_assert_eq!(expand_with(&text, |_| None), text);
        }
    }
}
