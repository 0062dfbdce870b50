//! Text helpers shared by the receipt and dictation parsers

use regex::Regex;
use std::sync::OnceLock;

/// Compile `pattern` once into `cell`. Patterns are literals in this crate.
pub fn cached_regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static pattern must compile"))
}

/// Parse a matched amount such as `3.99`, `12` or `4.`
pub fn parse_amount(digits: &str) -> Option<f64> {
    digits.trim_end_matches('.').parse().ok()
}

/// Replace whitespace runs with a single space and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
