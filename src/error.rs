//! Error types for the SQL safety guard.
//!
//! Internal failures (strict-mode parse errors, config load/parse errors)
//! are represented as [`AppError`] from `masterror`, matching the rest of
//! the crate's error-construction style. The one error the guard ever hands
//! back across a host boundary is [`SqlSafetyViolation`], kept as a plain
//! struct rather than routed through `masterror` because callers
//! pattern-match on its structured fields instead of just formatting it.

use std::fmt;

pub use masterror::{AppError, AppResult};

use crate::result::{RiskLevel, Violation};

/// Create a query parse error with optional position info.
pub fn query_parse_error(message: impl Into<String>) -> AppError {
    let msg = message.into();
    AppError::bad_request(format_sql_error("SQL parse error", &msg))
}

/// Create a config load/parse error.
pub fn config_error(message: impl Into<String>) -> AppError {
    AppError::bad_request(message.into())
}

/// Create a file read error for the demo CLI host.
pub fn file_read_error(path: &str, source: std::io::Error) -> AppError {
    AppError::bad_request(format!("failed to read '{path}': {source}"))
}

/// Format a SQL error with position highlighting, if the underlying
/// `sqlparser` message carries one.
fn format_sql_error(prefix: &str, message: &str) -> String {
    if let Some(pos) = extract_position(message) {
        format!(
            "{prefix} at line {line}, column {column}:\n  {message}",
            prefix = prefix,
            line = pos.line,
            column = pos.column,
            message = message
        )
    } else {
        format!("{}:\n  {}", prefix, message)
    }
}

struct SqlPosition {
    line:   usize,
    column: usize
}

/// Extract position from a `sqlparser` error message ("Line: X, Column Y").
fn extract_position(message: &str) -> Option<SqlPosition> {
    let line_marker = "Line: ";
    let col_marker = ", Column ";
    let line_start = message.find(line_marker)?;
    let line_num_start = line_start + line_marker.len();
    let rest = message.get(line_num_start..)?;
    let col_start = rest.find(col_marker)?;
    let line_str = message.get(line_num_start..line_num_start + col_start)?;
    let col_num_start = line_num_start + col_start + col_marker.len();
    let col_rest = message.get(col_num_start..)?;
    let col_end = col_rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(col_rest.len());
    let col_str = message.get(col_num_start..col_num_start + col_end)?;
    let line = line_str.parse().ok()?;
    let column = col_str.parse().ok()?;
    Some(SqlPosition {
        line,
        column
    })
}

/// The public boundary error raised when a validation outcome's effective
/// strategy is [`crate::strategy::ViolationStrategy::Block`].
///
/// Unlike the internal [`AppError`] taxonomy, this type exposes the
/// structured result so a host can decide what to do with it beyond
/// logging: inspect `risk_level`, render `violations`, or re-check the
/// offending `sql` against a different policy.
#[derive(Debug, Clone)]
pub struct SqlSafetyViolation {
    pub sql:          String,
    pub statement_id: Option<String>,
    pub risk_level:   RiskLevel,
    pub violations:   Vec<Violation>
}

impl SqlSafetyViolation {
    pub fn new(sql: impl Into<String>, risk_level: RiskLevel, violations: Vec<Violation>) -> Self {
        Self {
            sql: sql.into(),
            statement_id: None,
            risk_level,
            violations
        }
    }

    pub fn with_statement_id(mut self, id: impl Into<String>) -> Self {
        self.statement_id = Some(id.into());
        self
    }
}

impl fmt::Display for SqlSafetyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages = self
            .violations
            .iter()
            .map(|v| v.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "SQL validation failed: {}: {}", self.risk_level, messages)?;
        if let Some(id) = self.statement_id.as_deref() {
            write!(f, " (statement_id={id})")?;
        }
        Ok(())
    }
}

impl std::error::Error for SqlSafetyViolation {}
