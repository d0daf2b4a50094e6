//! What to do once a statement has violations: log it, warn about it, or
//! refuse to let it run.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    error::SqlSafetyViolation,
    result::ValidationResult
};

/// The resolved treatment for a violation. Never `Inherit` once attached to
/// a [`crate::result::Violation`] — that placeholder only exists in
/// configuration and is resolved against the guard's default at rule
/// construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationStrategy {
    Log,
    Warn,
    Block
}

/// The strategy as it appears in configuration, where a rule may simply
/// defer to the guard-wide default instead of naming one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationStrategyConfig {
    #[default]
    Inherit,
    Log,
    Warn,
    Block
}

impl ViolationStrategyConfig {
    pub fn resolve(self, default: ViolationStrategy) -> ViolationStrategy {
        match self {
            Self::Inherit => default,
            Self::Log => ViolationStrategy::Log,
            Self::Warn => ViolationStrategy::Warn,
            Self::Block => ViolationStrategy::Block
        }
    }
}

/// Apply the most severe treatment present across `result`'s violations.
///
/// `Block` wins over `Warn` wins over `Log`; an empty result is a no-op.
/// `Log`/`Warn` outcomes are emitted through `tracing` and always return
/// `Ok`; only `Block` raises [`SqlSafetyViolation`].
pub fn apply(
    result: &ValidationResult,
    sql: &str,
    statement_id: Option<&str>
) -> Result<(), SqlSafetyViolation> {
    let Some(effective) = result.violations.iter().map(|v| v.strategy).max() else {
        return Ok(());
    };

    match effective {
        ViolationStrategy::Log => {
            info!(
                risk_level = %result.risk_level(),
                violations = result.violations.len(),
                sql,
                "sql safety guard: logged violation(s)"
            );
            Ok(())
        }
        ViolationStrategy::Warn => {
            warn!(
                risk_level = %result.risk_level(),
                violations = result.violations.len(),
                sql,
                "sql safety guard: warned on violation(s)"
            );
            Ok(())
        }
        ViolationStrategy::Block => {
            warn!(
                risk_level = %result.risk_level(),
                violations = result.violations.len(),
                sql,
                "sql safety guard: blocking statement"
            );
            let mut err = SqlSafetyViolation::new(sql, result.risk_level(), result.violations.clone());
            if let Some(id) = statement_id {
                err = err.with_statement_id(id);
            }
            Err(err)
        }
    }
}
