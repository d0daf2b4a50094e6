//! Hook points a host wires the guard into around statement execution.
//!
//! [`PreExecutionHook`] is the enforcement point: call it with the SQL a
//! host is about to run, get back `Ok` (run it) or `Err` (don't). Its
//! default implementation, [`GuardHook`], also stashes the outcome in a
//! thread-local slot so a [`PostExecutionAuditHook`] running later in the
//! same call (after the statement actually executed, with row counts or
//! timing the guard itself never sees) can correlate its audit log entry
//! back to the validation that gated the call. That correlation slot is a
//! genuine cross-call thread-local — unlike [`crate::rules::RuleCtx`],
//! which is deliberately an explicit argument instead, because a rule
//! invocation begins and ends within a single `validate` call and has no
//! need to outlive it.

use std::cell::RefCell;

use crate::{
    context::SqlContext, error::SqlSafetyViolation, result::ValidationResult, validator::DefaultValidator
};

thread_local! {
    static LAST_VALIDATION: RefCell<Option<(ValidationResult, String)>> = const { RefCell::new(None) };
}

/// Runs before a host executes a statement; returning `Err` means the
/// statement must not run.
pub trait PreExecutionHook: Send + Sync {
    fn before_execute(&self, ctx: &SqlContext) -> Result<ValidationResult, SqlSafetyViolation>;
}

/// Runs after a host's statement execution completes, regardless of
/// outcome, to record an audit trail entry correlated with the validation
/// that gated it.
pub trait PostExecutionAuditHook: Send + Sync {
    fn after_execute(&self, sql: &str, succeeded: bool);
}

/// The guard's own [`PreExecutionHook`]: validates via a [`DefaultValidator`],
/// applies the effective strategy, and records the outcome for a later
/// [`PostExecutionAuditHook`] on the same thread to pick up.
pub struct GuardHook {
    validator: DefaultValidator
}

impl GuardHook {
    pub fn new(validator: DefaultValidator) -> Self {
        Self {
            validator
        }
    }
}

impl PreExecutionHook for GuardHook {
    fn before_execute(&self, ctx: &SqlContext) -> Result<ValidationResult, SqlSafetyViolation> {
        let result = self.validator.guard(ctx, ctx.statement_id())?;
        LAST_VALIDATION.with(|slot| {
            *slot.borrow_mut() = Some((result.clone(), ctx.sql().to_string()));
        });
        Ok(result)
    }
}

/// Default audit hook: logs completion through `tracing`, correlated with
/// whatever [`GuardHook::before_execute`] last recorded on this thread.
pub struct TracingAuditHook;

impl PostExecutionAuditHook for TracingAuditHook {
    fn after_execute(&self, sql: &str, succeeded: bool) {
        match take_last_validation() {
            Some((result, validated_sql)) if validated_sql == sql => {
                tracing::info!(
                    succeeded,
                    risk_level = %result.risk_level(),
                    violations = result.violations.len(),
                    sql,
                    "sql safety guard: statement executed"
                );
            }
            _ => {
                tracing::info!(succeeded, sql, "sql safety guard: statement executed (uncorrelated)");
            }
        }
    }
}

/// Take and clear this thread's last recorded validation outcome.
pub fn take_last_validation() -> Option<(ValidationResult, String)> {
    LAST_VALIDATION.with(|slot| slot.borrow_mut().take())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::GuardConfig, parser::SqlDialect, strategy::ViolationStrategy};

    #[test]
    fn before_execute_records_outcome_for_audit_hook() {
        let validator = DefaultValidator::new(&GuardConfig::default()).unwrap();
        let hook = GuardHook::new(validator);
        let ctx = SqlContext::new("SELECT id FROM users LIMIT 10", SqlDialect::Generic).unwrap();
        hook.before_execute(&ctx).unwrap();
        let (_, sql) = take_last_validation().unwrap();
        assert_eq!(sql, "SELECT id FROM users LIMIT 10");
    }

    #[test]
    fn before_execute_blocks_and_still_records_nothing_stale() {
        take_last_validation();
        let mut config = GuardConfig::default();
        config.default_strategy = ViolationStrategy::Block;
        let validator = DefaultValidator::new(&config).unwrap();
        let hook = GuardHook::new(validator);
        let ctx = SqlContext::new("DELETE FROM sessions", SqlDialect::Generic).unwrap();
        assert!(hook.before_execute(&ctx).is_err());
        assert!(take_last_validation().is_none());
    }
}
