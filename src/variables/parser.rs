//! Discover variable references inside query templates.
//!
//! Two reference forms are recognized:
//! - `$name`
//! - `${name}`, optionally followed by `.field` and/or `:format`
//!
//! The field and format suffixes are accepted but not interpreted yet.

use once_cell::sync::Lazy;
use regex::Regex;

static VARIABLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$([A-Za-z0-9_]+)|\$\{([A-Za-z0-9_]+)(?:\.([^:^}]+))?(?::([^}]+))?\}")
        .expect("variable pattern is valid")
});

/// Distinct variable names referenced in `text`, in order of first appearance
///
/// **Public** - used by the substitution engine and the `vars` command
pub fn parse_variables(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();

    for captures in VARIABLE_REGEX.captures_iter(text) {
        let Some(name) = captures.get(1).or_else(|| captures.get(2)) else {
            continue;
        };
        if !names.iter().any(|n| n == name.as_str()) {
            names.push(name.as_str().to_string());
        }
    }

    names
}
