//! Wildcard pattern matching for table/field allow- and deny-lists.
//!
//! Only a trailing `*` is a wildcard (`users_*` matches `users_archive`);
//! a `*` anywhere else in the pattern is rejected at config-load time
//! rather than silently ignored, so a typo'd pattern fails loudly instead
//! of quietly matching nothing.

use std::fmt;

/// A validated, case-insensitive match pattern: either an exact string or
/// a prefix (`prefix_*`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Exact(String),
    Prefix(String)
}

impl Pattern {
    pub fn compile(raw: &str) -> Result<Self, InvalidPatternError> {
        let star_count = raw.matches('*').count();
        if star_count == 0 {
            return Ok(Self::Exact(raw.to_ascii_lowercase()));
        }
        if star_count == 1 && raw.ends_with('*') {
            let prefix = raw[..raw.len() - 1].to_ascii_lowercase();
            return Ok(Self::Prefix(prefix));
        }
        Err(InvalidPatternError {
            pattern: raw.to_string()
        })
    }

    pub fn matches(&self, value: &str) -> bool {
        let value = value.to_ascii_lowercase();
        match self {
            Self::Exact(exact) => &value == exact,
            Self::Prefix(prefix) => value.starts_with(prefix.as_str())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPatternError {
    pub pattern: String
}

impl fmt::Display for InvalidPatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid pattern '{}': only a single trailing '*' is supported",
            self.pattern
        )
    }
}

impl std::error::Error for InvalidPatternError {}

/// Compile a whole list of patterns, failing on the first invalid one.
pub fn compile_all(raw: &[String]) -> Result<Vec<Pattern>, InvalidPatternError> {
    raw.iter().map(|p| Pattern::compile(p)).collect()
}

pub fn any_matches(patterns: &[Pattern], value: &str) -> bool {
    patterns.iter().any(|p| p.matches(value))
}
