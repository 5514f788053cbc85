//! Cell and variable name syntax.
//!
//! Both cell names and formula variables share one identifier grammar:
//! a letter or underscore followed by letters, digits or underscores.
//! Names are case-sensitive; any case folding is the caller's job via a
//! normalizer.
//!
//! # Examples
//!
//! ```
//! use cellgraph_engine::engine::is_valid_name;
//!
//! assert!(is_valid_name("A1"));
//! assert!(is_valid_name("_total"));
//! assert!(!is_valid_name("1A"));
//! ```

use regex::Regex;
use std::sync::OnceLock;

/// Anchored identifier pattern.
pub(crate) fn name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap())
}

/// Returns true if `name` is a syntactically legal cell or variable name.
pub fn is_valid_name(name: &str) -> bool {
    name_re().is_match(name)
}

/// Normalizer that leaves names untouched.
pub fn identity(name: &str) -> String {
    name.to_string()
}

/// Normalizer that upper-cases names, so `a1` and `A1` address the same cell.
pub fn uppercase(name: &str) -> String {
    name.to_ascii_uppercase()
}

/// Validator that accepts every syntactically legal name.
pub fn accept_all(_name: &str) -> bool {
    true
}
