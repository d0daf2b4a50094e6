//! Operational rules: pagination hygiene and the "don't let a write run
//! unbounded" baseline. None of these imply malicious intent on their own —
//! they catch statements that are merely risky to run at scale.

use super::{Rule, RuleCategory, RuleCtx, RuleInfo, StatementVisitor, security::DummyCondition};
use crate::{
    parser::statements::{DeleteStatement, SelectStatement, UpdateStatement},
    pattern::{Pattern, any_matches},
    result::RiskLevel,
    strategy::{ViolationStrategy, ViolationStrategyConfig}
};

/// `UPDATE`/`DELETE` without a `WHERE` clause touches every row in the
/// table; this is the single highest-value check in the catalog.
pub struct MissingWhereOnWrite {
    strategy: ViolationStrategy
}

impl MissingWhereOnWrite {
    pub fn new(strategy: ViolationStrategyConfig, default: ViolationStrategy) -> Self {
        Self {
            strategy: strategy.resolve(default)
        }
    }
}

impl StatementVisitor for MissingWhereOnWrite {
    fn visit_update(&self, stmt: &UpdateStatement, ctx: &mut RuleCtx<'_>) {
        if stmt.where_raw.is_none() {
            ctx.flag_with_suggestion(
                "UPDATE statement has no WHERE clause and will modify every row",
                Some("add a WHERE clause scoping the rows to update")
            );
        }
    }

    fn visit_delete(&self, stmt: &DeleteStatement, ctx: &mut RuleCtx<'_>) {
        if stmt.where_raw.is_none() {
            ctx.flag_with_suggestion(
                "DELETE statement has no WHERE clause and will remove every row",
                Some("add a WHERE clause scoping the rows to delete")
            );
        }
    }
}

impl Rule for MissingWhereOnWrite {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:           "OP001",
            name:         "Missing WHERE on write",
            category:     RuleCategory::Operational,
            default_risk: RiskLevel::Critical
        }
    }

    fn strategy(&self) -> ViolationStrategy {
        self.strategy
    }
}

/// A `SELECT` with neither a `LIMIT`/`OFFSET` clause nor a pagination
/// parameter can return an unbounded result set. Risk is stratified rather
/// than flat: a statement with no effective filter at all is worse than one
/// whose filter only narrows on fields a host has already flagged as
/// sensitive, which in turn is worse than a merely-unpaginated query over an
/// otherwise reasonable filter.
pub struct MissingPaginationSelect {
    blacklist_fields:           Vec<Pattern>,
    whitelisted_tables:         Vec<Pattern>,
    whitelisted_statement_ids:  Vec<String>,
    enforce_for_all_queries:    bool,
    strategy:                   ViolationStrategy
}

impl MissingPaginationSelect {
    pub fn new(
        blacklist_fields: Vec<Pattern>,
        whitelisted_tables: Vec<Pattern>,
        whitelisted_statement_ids: Vec<String>,
        enforce_for_all_queries: bool,
        strategy: ViolationStrategyConfig,
        default: ViolationStrategy
    ) -> Self {
        Self {
            blacklist_fields,
            whitelisted_tables,
            whitelisted_statement_ids,
            enforce_for_all_queries,
            strategy: strategy.resolve(default)
        }
    }

    fn is_whitelisted(&self, stmt: &SelectStatement, ctx: &RuleCtx<'_>) -> bool {
        if stmt
            .tables
            .iter()
            .any(|t| any_matches(&self.whitelisted_tables, t.as_str()))
        {
            return true;
        }
        ctx.context()
            .statement_id()
            .is_some_and(|id| self.whitelisted_statement_ids.iter().any(|w| w == id))
    }
}

impl StatementVisitor for MissingPaginationSelect {
    fn visit_select(&self, stmt: &SelectStatement, ctx: &mut RuleCtx<'_>) {
        let has_pagination = stmt.limit.is_some()
            || stmt.offset.is_some()
            || ctx.context().pagination_param().is_some();
        if has_pagination || self.is_whitelisted(stmt, ctx) {
            return;
        }

        let where_missing_or_dummy = match &stmt.where_raw {
            None => true,
            Some(raw) => DummyCondition::is_dummy(raw)
        };
        if where_missing_or_dummy {
            ctx.flag_override(
                RiskLevel::Critical,
                "SELECT without WHERE and without pagination",
                Some("add a LIMIT clause or bind a pagination parameter")
            );
            return;
        }

        let where_only_blacklisted = !stmt.where_cols.is_empty()
            && stmt
                .where_cols
                .iter()
                .all(|c| any_matches(&self.blacklist_fields, c.as_str()));
        if where_only_blacklisted {
            ctx.flag_override(
                RiskLevel::High,
                "WHERE uses only blacklist fields without pagination",
                Some("add a LIMIT clause or bind a pagination parameter")
            );
            return;
        }

        if self.enforce_for_all_queries {
            ctx.flag_override(
                RiskLevel::Medium,
                "SELECT has no LIMIT and no pagination parameter bound to it",
                Some("add a LIMIT clause or bind a pagination parameter")
            );
        }
    }
}

impl Rule for MissingPaginationSelect {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:           "OP002",
            name:         "Missing pagination on SELECT",
            category:     RuleCategory::Operational,
            // Every violation from this rule carries its own risk via
            // `flag_override`; this default never reaches a `Violation`.
            default_risk: RiskLevel::Medium
        }
    }

    fn strategy(&self) -> ViolationStrategy {
        self.strategy
    }
}

/// A deep `OFFSET` forces the database to scan and discard every preceding
/// row; past a configured threshold this is treated as a violation rather
/// than left to silently degrade.
pub struct DeepPagination {
    max_offset: u64,
    strategy:   ViolationStrategy
}

impl DeepPagination {
    pub fn new(max_offset: u64, strategy: ViolationStrategyConfig, default: ViolationStrategy) -> Self {
        Self {
            max_offset,
            strategy: strategy.resolve(default)
        }
    }

    fn effective_offset(&self, stmt: &SelectStatement, ctx: &RuleCtx<'_>) -> Option<u64> {
        stmt.offset.or_else(|| {
            ctx.context()
                .pagination_param()
                .map(|p| p.row_bounds().offset)
        })
    }
}

impl StatementVisitor for DeepPagination {
    fn visit_select(&self, stmt: &SelectStatement, ctx: &mut RuleCtx<'_>) {
        if let Some(offset) = self.effective_offset(stmt, ctx)
            && offset > self.max_offset
        {
            ctx.flag_with_suggestion(
                format!(
                    "OFFSET {offset} exceeds the configured maximum of {}",
                    self.max_offset
                ),
                Some("use keyset/cursor pagination instead of a deep OFFSET")
            );
        }
    }
}

impl Rule for DeepPagination {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:           "OP003",
            name:         "Deep pagination offset",
            category:     RuleCategory::Operational,
            default_risk: RiskLevel::Medium
        }
    }

    fn strategy(&self) -> ViolationStrategy {
        self.strategy
    }
}

/// Pagination expressed only logically, through a `WHERE id > ?`/`WHERE
/// cursor < ?`-style keyset predicate, with no `LIMIT` literally present to
/// bound how many rows past that point get returned. Low risk on its own —
/// keyset pagination is the right pattern for deep pages — but worth
/// surfacing since a missing `LIMIT` still means an unbounded scan forward
/// from the cursor.
pub struct LogicalPagination {
    strategy: ViolationStrategy
}

impl LogicalPagination {
    pub fn new(strategy: ViolationStrategyConfig, default: ViolationStrategy) -> Self {
        Self {
            strategy: strategy.resolve(default)
        }
    }

    fn looks_like_keyset(where_raw: &str) -> bool {
        let normalized: String = where_raw.chars().filter(|c| !c.is_whitespace()).collect();
        normalized.contains('>') || normalized.contains('<')
    }
}

impl StatementVisitor for LogicalPagination {
    fn visit_select(&self, stmt: &SelectStatement, ctx: &mut RuleCtx<'_>) {
        if stmt.limit.is_some() {
            return;
        }
        let Some(where_raw) = &stmt.where_raw else {
            return;
        };
        if Self::looks_like_keyset(where_raw) {
            ctx.flag_with_suggestion(
                "pagination is expressed only through a keyset WHERE predicate, with no LIMIT bounding it",
                Some("add a LIMIT clause alongside the keyset predicate")
            );
        }
    }
}

impl Rule for LogicalPagination {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:           "OP004",
            name:         "Logical pagination without LIMIT",
            category:     RuleCategory::Operational,
            default_risk: RiskLevel::Low
        }
    }

    fn strategy(&self) -> ViolationStrategy {
        self.strategy
    }
}

/// A `LIMIT`/page size past a configured ceiling, regardless of offset.
pub struct LargePageSize {
    max_page_size: u64,
    strategy:      ViolationStrategy
}

impl LargePageSize {
    pub fn new(
        max_page_size: u64,
        strategy: ViolationStrategyConfig,
        default: ViolationStrategy
    ) -> Self {
        Self {
            max_page_size,
            strategy: strategy.resolve(default)
        }
    }

    fn effective_limit(&self, stmt: &SelectStatement, ctx: &RuleCtx<'_>) -> Option<u64> {
        stmt.limit.or_else(|| {
            ctx.context()
                .pagination_param()
                .and_then(|p| p.row_bounds().limit)
        })
    }
}

impl StatementVisitor for LargePageSize {
    fn visit_select(&self, stmt: &SelectStatement, ctx: &mut RuleCtx<'_>) {
        if let Some(limit) = self.effective_limit(stmt, ctx)
            && limit > self.max_page_size
        {
            ctx.flag_with_suggestion(
                format!(
                    "page size {limit} exceeds the configured maximum of {}",
                    self.max_page_size
                ),
                Some("reduce the requested page size")
            );
        }
    }
}

impl Rule for LargePageSize {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:           "OP005",
            name:         "Large page size",
            category:     RuleCategory::Operational,
            default_risk: RiskLevel::Low
        }
    }

    fn strategy(&self) -> ViolationStrategy {
        self.strategy
    }
}

/// Paginating without an `ORDER BY` makes row order (and thus which rows
/// land on which page) undefined across calls.
pub struct MissingOrderByWithPagination {
    strategy: ViolationStrategy
}

impl MissingOrderByWithPagination {
    pub fn new(strategy: ViolationStrategyConfig, default: ViolationStrategy) -> Self {
        Self {
            strategy: strategy.resolve(default)
        }
    }
}

impl StatementVisitor for MissingOrderByWithPagination {
    fn visit_select(&self, stmt: &SelectStatement, ctx: &mut RuleCtx<'_>) {
        let is_paginated = stmt.limit.is_some()
            || stmt.offset.is_some()
            || ctx.context().pagination_param().is_some();
        if is_paginated && !stmt.has_order_by {
            ctx.flag_with_suggestion(
                "paginated SELECT has no ORDER BY, so page contents are not stable across calls",
                Some("add an ORDER BY over a unique or monotonic column")
            );
        }
    }
}

impl Rule for MissingOrderByWithPagination {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:           "OP006",
            name:         "Pagination without ORDER BY",
            category:     RuleCategory::Operational,
            default_risk: RiskLevel::Low
        }
    }

    fn strategy(&self) -> ViolationStrategy {
        self.strategy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        context::SqlContext,
        parser::SqlDialect,
        result::ValidationResult,
        rules::dispatch
    };

    fn check(rule: &dyn Rule, sql: &str) -> ValidationResult {
        let ctx = SqlContext::new(sql, SqlDialect::Generic).unwrap();
        let mut result = ValidationResult::new();
        dispatch(rule, &ctx, &mut result);
        result
    }

    fn pagination_rule(
        blacklist: &[&str],
        enforce_for_all_queries: bool
    ) -> MissingPaginationSelect {
        MissingPaginationSelect::new(
            blacklist.iter().map(|p| Pattern::compile(p).unwrap()).collect(),
            vec![],
            vec![],
            enforce_for_all_queries,
            ViolationStrategyConfig::Inherit,
            ViolationStrategy::Block
        )
    }

    #[test]
    fn flags_update_without_where() {
        let rule = MissingWhereOnWrite::new(ViolationStrategyConfig::Inherit, ViolationStrategy::Block);
        let result = check(&rule, "UPDATE users SET active = false");
        assert!(!result.passed());
        assert_eq!(result.risk_level(), RiskLevel::Critical);
    }

    #[test]
    fn allows_update_with_where() {
        let rule = MissingWhereOnWrite::new(ViolationStrategyConfig::Inherit, ViolationStrategy::Block);
        let result = check(&rule, "UPDATE users SET active = false WHERE id = 1");
        assert!(result.passed());
    }

    #[test]
    fn flags_delete_without_where() {
        let rule = MissingWhereOnWrite::new(ViolationStrategyConfig::Inherit, ViolationStrategy::Block);
        let result = check(&rule, "DELETE FROM sessions");
        assert!(!result.passed());
        assert_eq!(result.risk_level(), RiskLevel::Critical);
    }

    #[test]
    fn flags_select_without_where_as_critical() {
        let rule = pagination_rule(&[], false);
        let result = check(&rule, "SELECT * FROM users");
        assert!(!result.passed());
        assert_eq!(result.risk_level(), RiskLevel::Critical);
    }

    #[test]
    fn flags_select_with_only_blacklisted_where_as_high() {
        let rule = pagination_rule(&["deleted", "status"], false);
        let result = check(&rule, "SELECT * FROM users WHERE deleted = 0");
        assert!(!result.passed());
        assert_eq!(result.risk_level(), RiskLevel::High);
    }

    #[test]
    fn allows_select_with_normal_where_when_not_enforced() {
        let rule = pagination_rule(&["deleted"], false);
        let result = check(&rule, "SELECT id, name FROM users WHERE id = 1");
        assert!(result.passed());
    }

    #[test]
    fn flags_normal_where_as_medium_when_enforced_for_all_queries() {
        let rule = pagination_rule(&["deleted"], true);
        let result = check(&rule, "SELECT id, name FROM users WHERE id = 1");
        assert!(!result.passed());
        assert_eq!(result.risk_level(), RiskLevel::Medium);
    }

    #[test]
    fn allows_select_with_limit() {
        let rule = pagination_rule(&[], false);
        let result = check(&rule, "SELECT * FROM users LIMIT 50");
        assert!(result.passed());
    }

    #[test]
    fn allows_select_against_whitelisted_table() {
        let rule = MissingPaginationSelect::new(
            vec![],
            vec![Pattern::compile("reference_data").unwrap()],
            vec![],
            false,
            ViolationStrategyConfig::Inherit,
            ViolationStrategy::Block
        );
        let result = check(&rule, "SELECT * FROM reference_data");
        assert!(result.passed());
    }

    #[test]
    fn flags_deep_offset() {
        let rule = DeepPagination::new(10_000, ViolationStrategyConfig::Inherit, ViolationStrategy::Warn);
        let result = check(&rule, "SELECT id FROM users ORDER BY id LIMIT 20 OFFSET 50000");
        assert!(!result.passed());
    }

    #[test]
    fn flags_keyset_pagination_without_limit() {
        let rule = LogicalPagination::new(ViolationStrategyConfig::Inherit, ViolationStrategy::Warn);
        let result = check(&rule, "SELECT id FROM users WHERE id > 1000");
        assert!(!result.passed());
        assert_eq!(result.risk_level(), RiskLevel::Low);
    }

    #[test]
    fn allows_keyset_pagination_with_limit() {
        let rule = LogicalPagination::new(ViolationStrategyConfig::Inherit, ViolationStrategy::Warn);
        let result = check(&rule, "SELECT id FROM users WHERE id > 1000 LIMIT 20");
        assert!(result.passed());
    }

    #[test]
    fn flags_large_page_size() {
        let rule = LargePageSize::new(500, ViolationStrategyConfig::Inherit, ViolationStrategy::Warn);
        let result = check(&rule, "SELECT id FROM users LIMIT 5000");
        assert!(!result.passed());
    }

    #[test]
    fn flags_pagination_without_order_by() {
        let rule = MissingOrderByWithPagination::new(
            ViolationStrategyConfig::Inherit,
            ViolationStrategy::Warn
        );
        let result = check(&rule, "SELECT id FROM users LIMIT 20 OFFSET 40");
        assert!(!result.passed());
    }

    #[test]
    fn allows_pagination_with_order_by() {
        let rule = MissingOrderByWithPagination::new(
            ViolationStrategyConfig::Inherit,
            ViolationStrategy::Warn
        );
        let result = check(&rule, "SELECT id FROM users ORDER BY id LIMIT 20 OFFSET 40");
        assert!(result.passed());
    }
}
