//! Field Name Sanitizer
//!
//! Maps arbitrary strings onto Munin data source names. See
//! http://munin.projects.linpro.no/wiki/notes_on_datasource_names

use std::sync::OnceLock;
use regex::Regex;

/// Largest field name Munin accepts
pub const MAX_FIELDNAME_LEN: usize = 19;

fn leading_non_identifier_start() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^A-Za-z_]").expect("valid leading character pattern"))
}

fn leading_non_identifier() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^A-Za-z0-9_]").expect("valid leading character pattern"))
}

/// Returns a valid field name for `name`.
///
/// Only the first character is normalised; interior characters are passed
/// through unchanged. The result is truncated to [`MAX_FIELDNAME_LEN`]
/// characters. Never fails: the empty string maps to itself.
pub fn fieldname(name: &str) -> String {
    // Fix the first character
    let name = leading_non_identifier_start().replace(name, "_");
    // Fix the rest
    let name = leading_non_identifier().replace(&name, "_");
    name.chars().take(MAX_FIELDNAME_LEN).collect()
}
