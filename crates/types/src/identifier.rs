//! Identifier grammar for environment names and variable keys

use regex::Regex;
use std::sync::LazyLock;

static IDENTIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w|-)+$").expect("identifier pattern is valid"));

/// Whether `name` matches `(\w|-)+` in full
#[must_use]
pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER_REGEX.is_match(name)
}
