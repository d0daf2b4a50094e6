//! [`DefaultValidator`]: builds the rule catalog from a [`GuardConfig`] once,
//! then validates any number of [`SqlContext`]s against it.

use crate::{
    cache::{DedupFilter, parse_cached},
    config::GuardConfig,
    context::SqlContext,
    error::AppResult,
    orchestrator::RuleOrchestrator,
    parser::SqlDialect,
    pattern::compile_all,
    result::{RiskLevel, ValidationResult},
    rules::{
        operational::{
            DeepPagination, LargePageSize, LogicalPagination, MissingOrderByWithPagination,
            MissingPaginationSelect, MissingWhereOnWrite
        },
        security::{
            BlacklistField, CallExecute, DangerousFunction, DdlOperation, DeniedTable, DummyCondition,
            IntoOutfile, MetadataStatement, MultiStatement, ReadOnlyTable, SetOperation, SetStatement,
            SqlComment, WhitelistField
        }
    },
    strategy
};

/// Builds the fixed rule catalog once from a [`GuardConfig`] and validates
/// SQL text or already-built contexts against it.
///
/// Cheap to clone a reference to and share across threads: nothing in the
/// rule catalog is mutated after construction.
pub struct DefaultValidator {
    orchestrator: RuleOrchestrator
}

impl DefaultValidator {
    pub fn new(config: &GuardConfig) -> AppResult<Self> {
        let denied_tables = compile_all(&config.tables.denied)
            .map_err(|e| crate::error::config_error(e.to_string()))?;
        let read_only_tables = compile_all(&config.tables.read_only)
            .map_err(|e| crate::error::config_error(e.to_string()))?;
        let blacklist_fields = compile_all(&config.fields.blacklist)
            .map_err(|e| crate::error::config_error(e.to_string()))?;
        let whitelist_fields = compile_all(&config.fields.whitelist)
            .map_err(|e| crate::error::config_error(e.to_string()))?;
        let pagination_whitelisted_tables = compile_all(&config.pagination.whitelisted_tables)
            .map_err(|e| crate::error::config_error(e.to_string()))?;
        let default = config.default_strategy;

        let rules: Vec<Box<dyn crate::rules::Rule>> = vec![
            Box::new(MissingWhereOnWrite::new(config.strategy_for("OP001"), default)),
            Box::new(MissingPaginationSelect::new(
                blacklist_fields.clone(),
                pagination_whitelisted_tables,
                config.pagination.whitelisted_statement_ids.clone(),
                config.enforce_for_all_queries,
                config.strategy_for("OP002"),
                default
            )),
            Box::new(DeepPagination::new(
                config.max_offset,
                config.strategy_for("OP003"),
                default
            )),
            Box::new(LogicalPagination::new(config.strategy_for("OP004"), default)),
            Box::new(LargePageSize::new(
                config.max_page_size,
                config.strategy_for("OP005"),
                default
            )),
            Box::new(MissingOrderByWithPagination::new(
                config.strategy_for("OP006"),
                default
            )),
            Box::new(DummyCondition::new(config.strategy_for("SEC001"), default)),
            Box::new(BlacklistField::new(
                blacklist_fields,
                config.strategy_for("SEC002"),
                default
            )),
            Box::new(WhitelistField::new(
                whitelist_fields,
                config.strategy_for("SEC003"),
                default
            )),
            Box::new(DeniedTable::new(
                denied_tables,
                config.strategy_for("SEC004"),
                default
            )),
            Box::new(ReadOnlyTable::new(
                read_only_tables,
                config.strategy_for("SEC005"),
                default
            )),
            Box::new(MultiStatement::new(config.strategy_for("SEC006"), default)),
            Box::new(SetOperation::new(config.strategy_for("SEC007"), default)),
            Box::new(SqlComment::new(config.strategy_for("SEC008"), default)),
            Box::new(IntoOutfile::new(config.strategy_for("SEC009"), default)),
            Box::new(DdlOperation::new(config.strategy_for("SEC010"), default)),
            Box::new(DangerousFunction::new(config.strategy_for("SEC011"), default)),
            Box::new(CallExecute::new(config.strategy_for("SEC012"), default)),
            Box::new(MetadataStatement::new(config.strategy_for("SEC013"), default)),
            Box::new(SetStatement::new(config.strategy_for("SEC014"), default)),
        ];

        Ok(Self {
            orchestrator: RuleOrchestrator::new(rules)
        })
    }

    pub fn rule_count(&self) -> usize {
        self.orchestrator.rule_count()
    }

    /// Validate raw SQL text under `dialect`, going through the parse cache
    /// and the per-thread dedup filter.
    ///
    /// The dedup filter only short-circuits when the last outcome recorded
    /// for this exact SQL text was [`RiskLevel::Safe`] — anything riskier
    /// needs its full violation list re-derived so a caller can still act
    /// on it, so only a clean bill of health is ever reused.
    pub fn validate(&self, sql: &str, dialect: SqlDialect) -> ValidationResult {
        if let Some(RiskLevel::Safe) = DedupFilter::cached_outcome(sql) {
            return ValidationResult::new();
        }

        let statement = parse_cached(sql, dialect);
        let ctx = match SqlContext::with_parsed(sql, dialect, statement) {
            Ok(ctx) => ctx,
            Err(_) => return ValidationResult::new()
        };

        let result = self.validate_ctx(&ctx);
        DedupFilter::record(sql, result.risk_level());
        result
    }

    /// Validate an already-built [`SqlContext`] — the path a host uses when
    /// it has bound parameters (pagination objects, etc.) to attach.
    pub fn validate_ctx(&self, ctx: &SqlContext) -> ValidationResult {
        let mut result = ValidationResult::new();
        self.orchestrator.run(ctx, &mut result);
        result
    }

    /// Validate `ctx` and resolve the outcome into the effective treatment:
    /// `Ok(())` for a passing or log/warn-only result, `Err` once the
    /// effective strategy is [`crate::strategy::ViolationStrategy::Block`].
    pub fn guard(
        &self,
        ctx: &SqlContext,
        statement_id: Option<&str>
    ) -> Result<ValidationResult, crate::error::SqlSafetyViolation> {
        let result = self.validate_ctx(ctx);
        strategy::apply(&result, ctx.sql(), statement_id)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds_full_rule_catalog() {
        let validator = DefaultValidator::new(&GuardConfig::default()).unwrap();
        assert_eq!(validator.rule_count(), 20);
    }

    #[test]
    fn unbounded_delete_fails_guard_with_block_default() {
        let mut config = GuardConfig::default();
        config.default_strategy = crate::strategy::ViolationStrategy::Block;
        let validator = DefaultValidator::new(&config).unwrap();
        let ctx = SqlContext::new("DELETE FROM sessions", SqlDialect::Generic).unwrap();
        let err = validator.guard(&ctx, Some("stmt-1")).unwrap_err();
        assert_eq!(err.statement_id.as_deref(), Some("stmt-1"));
    }

    #[test]
    fn safe_statement_passes_guard() {
        let validator = DefaultValidator::new(&GuardConfig::default()).unwrap();
        let ctx = SqlContext::new("SELECT id FROM users WHERE id = 1 LIMIT 10", SqlDialect::Generic).unwrap();
        assert!(validator.guard(&ctx, None).is_ok());
    }

    #[test]
    fn denied_table_from_config_is_enforced() {
        let mut config = GuardConfig::default();
        config.tables.denied = vec!["secrets".into()];
        config.default_strategy = crate::strategy::ViolationStrategy::Block;
        let validator = DefaultValidator::new(&config).unwrap();
        let ctx = SqlContext::new("SELECT * FROM secrets LIMIT 10", SqlDialect::Generic).unwrap();
        assert!(validator.guard(&ctx, None).is_err());
    }
}
