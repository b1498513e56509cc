//! Prompt content validation.
//!
//! Every prompt must pass through [`validate_prompt`] before it reaches the
//! downstream handler. The check is a strict allow-list: ASCII letters,
//! digits, ASCII whitespace and the punctuation `?`, `.` and `,`.

use regex::Regex;
use std::sync::LazyLock;

// `(?-u:\s)` keeps the whitespace class to ASCII: space, \t, \n, \x0B, \x0C, \r.
static ALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[a-zA-Z0-9?.,]|(?-u:\s))+$").expect("valid allow-list"));

/// Returns `true` if `input` is non-empty and made up only of allowed
/// characters.
///
/// There is no upper bound on length.
pub fn validate_prompt(input: &str) -> bool {
    ALLOWED.is_match(input)
}
