//! Security rules: statements that look like an attempt to exceed, evade,
//! or abuse the privileges a caller was meant to have.

use indexmap::IndexSet;

use super::{Rule, RuleCategory, RuleCtx, RuleInfo, StatementVisitor};
use crate::{
    parser::statements::{DeleteStatement, InsertStatement, SelectStatement, UpdateStatement},
    pattern::Pattern,
    result::RiskLevel,
    strategy::{ViolationStrategy, ViolationStrategyConfig}
};

/// Masks out the contents of single-quoted string literals (respecting the
/// `''` escape), so text-scanning rules don't trip over semicolons,
/// comment markers, or keywords that merely appear inside a string value.
fn mask_string_literals(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    let mut in_string = false;
    while let Some(c) = chars.next() {
        if in_string {
            if c == '\'' {
                if chars.peek() == Some(&'\'') {
                    out.push('#');
                    out.push(chars.next().unwrap());
                    continue;
                }
                in_string = false;
                out.push('\'');
            } else {
                out.push('#');
            }
        } else if c == '\'' {
            in_string = true;
            out.push('\'');
        } else {
            out.push(c);
        }
    }
    out
}

/// Tautological `WHERE` predicates (`1=1`, `'a'='a'`, bare `TRUE`) that
/// always evaluate true regardless of bound parameters — a classic sign of
/// a dummy condition left in place to neutralize a filter, whether by
/// injection or by accident. Deliberately does not attempt the
/// same-column case (`id = id`): that needs schema knowledge to tell apart
/// from a legitimate self-join predicate.
pub struct DummyCondition {
    strategy: ViolationStrategy
}

impl DummyCondition {
    pub fn new(strategy: ViolationStrategyConfig, default: ViolationStrategy) -> Self {
        Self {
            strategy: strategy.resolve(default)
        }
    }

    pub(crate) fn is_dummy(where_raw: &str) -> bool {
        let normalized: String = where_raw.chars().filter(|c| !c.is_whitespace()).collect();
        let upper = normalized.to_uppercase();
        if upper == "TRUE" || upper.contains("1=1") || upper.contains("'1'='1'") {
            return true;
        }
        if let Some(eq_pos) = normalized.find('=') {
            let (left, right) = (&normalized[..eq_pos], &normalized[eq_pos + 1..]);
            if !left.is_empty() && left.eq_ignore_ascii_case(right) {
                let is_literal = |s: &str| {
                    (s.starts_with('\'') && s.ends_with('\'') && s.len() >= 2)
                        || s.chars().all(|c| c.is_ascii_digit())
                };
                if is_literal(left) && is_literal(right) {
                    return true;
                }
            }
        }
        false
    }

    fn check(&self, where_raw: &Option<String>, ctx: &mut RuleCtx<'_>) {
        if let Some(raw) = where_raw
            && Self::is_dummy(raw)
        {
            ctx.flag_with_suggestion(
                format!("WHERE clause '{raw}' is a tautology and matches every row"),
                Some("replace the dummy condition with a real filter")
            );
        }
    }
}

impl StatementVisitor for DummyCondition {
    fn visit_select(&self, stmt: &SelectStatement, ctx: &mut RuleCtx<'_>) {
        self.check(&stmt.where_raw, ctx);
    }

    fn visit_update(&self, stmt: &UpdateStatement, ctx: &mut RuleCtx<'_>) {
        self.check(&stmt.where_raw, ctx);
    }

    fn visit_delete(&self, stmt: &DeleteStatement, ctx: &mut RuleCtx<'_>) {
        self.check(&stmt.where_raw, ctx);
    }
}

impl Rule for DummyCondition {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:           "SEC001",
            name:         "Dummy WHERE condition",
            category:     RuleCategory::Security,
            default_risk: RiskLevel::High
        }
    }

    fn strategy(&self) -> ViolationStrategy {
        self.strategy
    }
}

fn referenced_columns(cols: &[&[compact_str::CompactString]]) -> IndexSet<String> {
    cols.iter()
        .flat_map(|c| c.iter())
        .map(|c| c.to_string())
        .collect()
}

/// A statement references a column on the configured blacklist (e.g.
/// `password_hash`, `ssn`) in a clause where a host would not expect it to
/// leave the data layer.
pub struct BlacklistField {
    patterns: Vec<Pattern>,
    strategy: ViolationStrategy
}

impl BlacklistField {
    pub fn new(patterns: Vec<Pattern>, strategy: ViolationStrategyConfig, default: ViolationStrategy) -> Self {
        Self {
            patterns,
            strategy: strategy.resolve(default)
        }
    }

    fn check(&self, cols: &[&[compact_str::CompactString]], ctx: &mut RuleCtx<'_>) {
        for col in referenced_columns(cols) {
            if crate::pattern::any_matches(&self.patterns, &col) {
                ctx.flag_with_suggestion(
                    format!("column '{col}' is on the blacklist and must not be referenced"),
                    Some("remove the blacklisted column from the statement")
                );
            }
        }
    }
}

impl StatementVisitor for BlacklistField {
    fn visit_select(&self, stmt: &SelectStatement, ctx: &mut RuleCtx<'_>) {
        self.check(
            &[
                stmt.where_cols.as_slice(),
                stmt.join_cols.as_slice(),
                stmt.group_cols.as_slice(),
                stmt.having_cols.as_slice(),
                stmt.order_cols.as_slice()
            ],
            ctx
        );
    }

    fn visit_update(&self, stmt: &UpdateStatement, ctx: &mut RuleCtx<'_>) {
        self.check(&[stmt.where_cols.as_slice()], ctx);
    }

    fn visit_delete(&self, stmt: &DeleteStatement, ctx: &mut RuleCtx<'_>) {
        self.check(&[stmt.where_cols.as_slice()], ctx);
    }

    fn visit_insert(&self, stmt: &InsertStatement, ctx: &mut RuleCtx<'_>) {
        for col in &stmt.columns {
            if crate::pattern::any_matches(&self.patterns, col) {
                ctx.flag_with_suggestion(
                    format!("column '{col}' is on the blacklist and must not be inserted"),
                    Some("remove the blacklisted column from the statement")
                );
            }
        }
    }
}

impl Rule for BlacklistField {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:           "SEC002",
            name:         "Blacklisted field referenced",
            category:     RuleCategory::Security,
            default_risk: RiskLevel::Critical
        }
    }

    fn strategy(&self) -> ViolationStrategy {
        self.strategy
    }
}

/// When a non-empty whitelist is configured, any referenced column that
/// isn't on it is a violation. An empty whitelist disables the rule.
pub struct WhitelistField {
    patterns: Vec<Pattern>,
    strategy: ViolationStrategy
}

impl WhitelistField {
    pub fn new(patterns: Vec<Pattern>, strategy: ViolationStrategyConfig, default: ViolationStrategy) -> Self {
        Self {
            patterns,
            strategy: strategy.resolve(default)
        }
    }

    fn check(&self, cols: &[&[compact_str::CompactString]], ctx: &mut RuleCtx<'_>) {
        if self.patterns.is_empty() {
            return;
        }
        for col in referenced_columns(cols) {
            if !crate::pattern::any_matches(&self.patterns, &col) {
                ctx.flag_with_suggestion(
                    format!("column '{col}' is not on the allowed column whitelist"),
                    Some("only reference whitelisted columns, or extend the whitelist")
                );
            }
        }
    }
}

impl StatementVisitor for WhitelistField {
    fn visit_select(&self, stmt: &SelectStatement, ctx: &mut RuleCtx<'_>) {
        self.check(&[stmt.where_cols.as_slice(), stmt.group_cols.as_slice(), stmt.having_cols.as_slice()], ctx);
    }

    fn visit_update(&self, stmt: &UpdateStatement, ctx: &mut RuleCtx<'_>) {
        self.check(&[stmt.where_cols.as_slice()], ctx);
    }

    fn visit_delete(&self, stmt: &DeleteStatement, ctx: &mut RuleCtx<'_>) {
        self.check(&[stmt.where_cols.as_slice()], ctx);
    }
}

impl Rule for WhitelistField {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:           "SEC003",
            name:         "Field not on whitelist",
            category:     RuleCategory::Security,
            default_risk: RiskLevel::High
        }
    }

    fn strategy(&self) -> ViolationStrategy {
        self.strategy
    }
}

fn referenced_tables(tables: &[compact_str::CompactString], patterns: &[Pattern]) -> Vec<String> {
    tables
        .iter()
        .filter(|t| crate::pattern::any_matches(patterns, t))
        .map(|t| t.to_string())
        .collect()
}

/// A statement touches a table on the configured deny-list, regardless of
/// statement kind.
pub struct DeniedTable {
    patterns: Vec<Pattern>,
    strategy: ViolationStrategy
}

impl DeniedTable {
    pub fn new(patterns: Vec<Pattern>, strategy: ViolationStrategyConfig, default: ViolationStrategy) -> Self {
        Self {
            patterns,
            strategy: strategy.resolve(default)
        }
    }

    fn flag_tables(&self, tables: &[compact_str::CompactString], ctx: &mut RuleCtx<'_>) {
        for table in referenced_tables(tables, &self.patterns) {
            ctx.flag_with_suggestion(
                format!("table '{table}' is denied by policy"),
                Some("remove or replace the denied table reference")
            );
        }
    }
}

impl StatementVisitor for DeniedTable {
    fn visit_select(&self, stmt: &SelectStatement, ctx: &mut RuleCtx<'_>) {
        self.flag_tables(&stmt.tables, ctx);
    }

    fn visit_update(&self, stmt: &UpdateStatement, ctx: &mut RuleCtx<'_>) {
        self.flag_tables(&stmt.tables, ctx);
    }

    fn visit_delete(&self, stmt: &DeleteStatement, ctx: &mut RuleCtx<'_>) {
        self.flag_tables(&stmt.tables, ctx);
    }

    fn visit_insert(&self, stmt: &InsertStatement, ctx: &mut RuleCtx<'_>) {
        self.flag_tables(std::slice::from_ref(&stmt.table), ctx);
    }
}

impl Rule for DeniedTable {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:           "SEC004",
            name:         "Denied table",
            category:     RuleCategory::Security,
            default_risk: RiskLevel::Critical
        }
    }

    fn strategy(&self) -> ViolationStrategy {
        self.strategy
    }
}

/// A table marked read-only by policy is the target of a write.
pub struct ReadOnlyTable {
    patterns: Vec<Pattern>,
    strategy: ViolationStrategy
}

impl ReadOnlyTable {
    pub fn new(patterns: Vec<Pattern>, strategy: ViolationStrategyConfig, default: ViolationStrategy) -> Self {
        Self {
            patterns,
            strategy: strategy.resolve(default)
        }
    }

    fn flag_tables(&self, tables: &[compact_str::CompactString], ctx: &mut RuleCtx<'_>) {
        for table in referenced_tables(tables, &self.patterns) {
            ctx.flag_with_suggestion(
                format!("table '{table}' is read-only and cannot be written to"),
                Some("route this write through a table that allows writes")
            );
        }
    }
}

impl StatementVisitor for ReadOnlyTable {
    fn visit_update(&self, stmt: &UpdateStatement, ctx: &mut RuleCtx<'_>) {
        self.flag_tables(&stmt.tables, ctx);
    }

    fn visit_delete(&self, stmt: &DeleteStatement, ctx: &mut RuleCtx<'_>) {
        self.flag_tables(&stmt.tables, ctx);
    }

    fn visit_insert(&self, stmt: &InsertStatement, ctx: &mut RuleCtx<'_>) {
        self.flag_tables(std::slice::from_ref(&stmt.table), ctx);
    }
}

impl Rule for ReadOnlyTable {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:           "SEC005",
            name:         "Write to read-only table",
            category:     RuleCategory::Security,
            default_risk: RiskLevel::Critical
        }
    }

    fn strategy(&self) -> ViolationStrategy {
        self.strategy
    }
}

/// More than one top-level statement in a single SQL text — the classic
/// stacked-query injection shape. Operates on raw text regardless of parse
/// outcome, since a host submitting `SELECT ...; DROP TABLE ...` may still
/// have its first statement parse cleanly.
pub struct MultiStatement {
    strategy: ViolationStrategy
}

impl MultiStatement {
    pub fn new(strategy: ViolationStrategyConfig, default: ViolationStrategy) -> Self {
        Self {
            strategy: strategy.resolve(default)
        }
    }
}

impl StatementVisitor for MultiStatement {
    fn visit_any(&self, sql: &str, ctx: &mut RuleCtx<'_>) {
        let masked = mask_string_literals(sql);
        let statement_count = masked
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .count();
        if statement_count > 1 {
            ctx.flag_with_suggestion(
                format!("SQL text contains {statement_count} statements separated by ';'"),
                Some("submit one statement per call")
            );
        }
    }
}

impl Rule for MultiStatement {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:           "SEC006",
            name:         "Multiple statements in one call",
            category:     RuleCategory::Security,
            default_risk: RiskLevel::Critical
        }
    }

    fn strategy(&self) -> ViolationStrategy {
        self.strategy
    }
}

/// A `SELECT` combined via `UNION`/`INTERSECT`/`EXCEPT` — a common vector
/// for smuggling an attacker-controlled result set alongside a legitimate
/// query.
pub struct SetOperation {
    strategy: ViolationStrategy
}

impl SetOperation {
    pub fn new(strategy: ViolationStrategyConfig, default: ViolationStrategy) -> Self {
        Self {
            strategy: strategy.resolve(default)
        }
    }
}

impl StatementVisitor for SetOperation {
    fn visit_select(&self, stmt: &SelectStatement, ctx: &mut RuleCtx<'_>) {
        if stmt.has_union {
            ctx.flag_with_suggestion(
                "SELECT uses a set operation (UNION/INTERSECT/EXCEPT)",
                Some("verify both sides of the set operation are intended, not attacker-controlled")
            );
        }
    }
}

impl Rule for SetOperation {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:           "SEC007",
            name:         "Set operation in SELECT",
            category:     RuleCategory::Security,
            default_risk: RiskLevel::High
        }
    }

    fn strategy(&self) -> ViolationStrategy {
        self.strategy
    }
}

/// An inline comment marker (`--`, `/* */`, `#`) outside of any string
/// literal — often used to truncate the rest of a statement in an
/// injection payload.
pub struct SqlComment {
    strategy: ViolationStrategy
}

impl SqlComment {
    pub fn new(strategy: ViolationStrategyConfig, default: ViolationStrategy) -> Self {
        Self {
            strategy: strategy.resolve(default)
        }
    }
}

impl StatementVisitor for SqlComment {
    fn visit_any(&self, sql: &str, ctx: &mut RuleCtx<'_>) {
        let masked = mask_string_literals(sql);
        if masked.contains("--") || masked.contains("/*") || masked.contains('#') {
            ctx.flag_with_suggestion(
                "SQL text contains an inline comment marker outside any string literal",
                Some("remove inline comments from executed SQL text")
            );
        }
    }
}

impl Rule for SqlComment {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:           "SEC008",
            name:         "Inline SQL comment",
            category:     RuleCategory::Security,
            default_risk: RiskLevel::Medium
        }
    }

    fn strategy(&self) -> ViolationStrategy {
        self.strategy
    }
}

/// `INTO OUTFILE`/`INTO DUMPFILE` (MySQL) or `COPY ... TO` (Postgres) — a
/// SELECT that writes query results to the filesystem.
pub struct IntoOutfile {
    strategy: ViolationStrategy
}

impl IntoOutfile {
    pub fn new(strategy: ViolationStrategyConfig, default: ViolationStrategy) -> Self {
        Self {
            strategy: strategy.resolve(default)
        }
    }
}

impl StatementVisitor for IntoOutfile {
    fn visit_any(&self, sql: &str, ctx: &mut RuleCtx<'_>) {
        let upper = sql.to_uppercase();
        if upper.contains("INTO OUTFILE") || upper.contains("INTO DUMPFILE") {
            ctx.flag_with_suggestion(
                "SQL text writes query results directly to a server-side file",
                Some("export data through the application layer instead of INTO OUTFILE/DUMPFILE")
            );
        }
    }
}

impl Rule for IntoOutfile {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:           "SEC009",
            name:         "File write via SELECT",
            category:     RuleCategory::Security,
            default_risk: RiskLevel::Critical
        }
    }

    fn strategy(&self) -> ViolationStrategy {
        self.strategy
    }
}

const DDL_KEYWORDS: &[&str] = &["CREATE ", "ALTER ", "DROP ", "TRUNCATE "];

/// A DDL statement (`CREATE`/`ALTER`/`DROP`/`TRUNCATE`) reached the guard.
/// These never classify into a `SelectStatement`/etc, so this is a
/// `visit_any` text check rather than a kind-specific visit.
pub struct DdlOperation {
    strategy: ViolationStrategy
}

impl DdlOperation {
    pub fn new(strategy: ViolationStrategyConfig, default: ViolationStrategy) -> Self {
        Self {
            strategy: strategy.resolve(default)
        }
    }
}

impl StatementVisitor for DdlOperation {
    fn visit_any(&self, sql: &str, ctx: &mut RuleCtx<'_>) {
        let upper = sql.trim_start().to_uppercase();
        if let Some(keyword) = DDL_KEYWORDS.iter().find(|kw| upper.starts_with(*kw)) {
            ctx.flag_with_suggestion(
                format!("statement performs a DDL operation ({})", keyword.trim()),
                Some("run schema changes through migrations, not application queries")
            );
        }
    }
}

impl Rule for DdlOperation {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:           "SEC010",
            name:         "DDL statement",
            category:     RuleCategory::Security,
            default_risk: RiskLevel::Critical
        }
    }

    fn strategy(&self) -> ViolationStrategy {
        self.strategy
    }
}

const DANGEROUS_FUNCTIONS: &[&str] = &[
    "load_file",
    "xp_cmdshell",
    "sp_executesql",
    "sleep",
    "benchmark",
    "pg_sleep",
    "pg_read_file",
    "dbms_lock.sleep"
];

/// A call to a function known to enable file access, command execution, or
/// time-based side channel attacks (`SLEEP`, `LOAD_FILE`, `xp_cmdshell`, ...).
pub struct DangerousFunction {
    strategy: ViolationStrategy
}

impl DangerousFunction {
    pub fn new(strategy: ViolationStrategyConfig, default: ViolationStrategy) -> Self {
        Self {
            strategy: strategy.resolve(default)
        }
    }

    fn check(&self, calls: &[compact_str::CompactString], ctx: &mut RuleCtx<'_>) {
        for call in calls {
            let lower = call.to_lowercase();
            if DANGEROUS_FUNCTIONS.contains(&lower.as_str()) {
                ctx.flag_with_suggestion(
                    format!("call to dangerous function '{call}'"),
                    Some("remove the call or route it through an audited code path")
                );
            }
        }
    }
}

impl StatementVisitor for DangerousFunction {
    fn visit_select(&self, stmt: &SelectStatement, ctx: &mut RuleCtx<'_>) {
        self.check(&stmt.function_calls, ctx);
    }

    fn visit_update(&self, stmt: &UpdateStatement, ctx: &mut RuleCtx<'_>) {
        self.check(&stmt.function_calls, ctx);
    }

    fn visit_delete(&self, stmt: &DeleteStatement, ctx: &mut RuleCtx<'_>) {
        self.check(&stmt.function_calls, ctx);
    }
}

impl Rule for DangerousFunction {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:           "SEC011",
            name:         "Dangerous function call",
            category:     RuleCategory::Security,
            default_risk: RiskLevel::High
        }
    }

    fn strategy(&self) -> ViolationStrategy {
        self.strategy
    }
}

/// `CALL`/`EXEC`/`EXECUTE` of a stored procedure — opaque to this guard's
/// own rule set since a procedure's body isn't visible to it.
pub struct CallExecute {
    strategy: ViolationStrategy
}

impl CallExecute {
    pub fn new(strategy: ViolationStrategyConfig, default: ViolationStrategy) -> Self {
        Self {
            strategy: strategy.resolve(default)
        }
    }
}

impl StatementVisitor for CallExecute {
    fn visit_any(&self, sql: &str, ctx: &mut RuleCtx<'_>) {
        let trimmed = sql.trim_start();
        let upper = trimmed.to_uppercase();
        let keyword_len = if upper.starts_with("EXECUTE ") {
            "EXECUTE ".len()
        } else if upper.starts_with("EXEC ") {
            "EXEC ".len()
        } else if upper.starts_with("CALL ") {
            "CALL ".len()
        } else {
            return;
        };

        let proc_name = trimmed[keyword_len..]
            .trim_start()
            .split(|c: char| c == '(' || c.is_whitespace())
            .next()
            .unwrap_or("")
            .trim();

        let message = if proc_name.is_empty() {
            "statement invokes a stored procedure whose body this guard cannot inspect".to_string()
        } else {
            format!("Stored procedure invocation: {proc_name}")
        };
        ctx.flag_with_suggestion(
            message,
            Some("validate the procedure's own body separately, or inline the logic")
        );
    }
}

impl Rule for CallExecute {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:           "SEC012",
            name:         "Stored procedure invocation",
            category:     RuleCategory::Security,
            default_risk: RiskLevel::High
        }
    }

    fn strategy(&self) -> ViolationStrategy {
        self.strategy
    }
}

const METADATA_MARKERS: &[&str] = &[
    "INFORMATION_SCHEMA",
    "PG_CATALOG",
    "PG_TABLES",
    "SYS.",
    "SQLITE_MASTER"
];

/// A statement reads catalog/metadata tables, or is itself a metadata
/// statement (`SHOW`/`DESCRIBE`/`EXPLAIN`) — schema reconnaissance is a
/// common precursor to a targeted attack.
pub struct MetadataStatement {
    strategy: ViolationStrategy
}

impl MetadataStatement {
    pub fn new(strategy: ViolationStrategyConfig, default: ViolationStrategy) -> Self {
        Self {
            strategy: strategy.resolve(default)
        }
    }
}

impl StatementVisitor for MetadataStatement {
    fn visit_any(&self, sql: &str, ctx: &mut RuleCtx<'_>) {
        let upper = sql.to_uppercase();
        let trimmed = upper.trim_start();
        let is_metadata_statement = trimmed.starts_with("SHOW ")
            || trimmed.starts_with("DESCRIBE ")
            || trimmed.starts_with("DESC ")
            || trimmed.starts_with("EXPLAIN ");
        let touches_catalog = METADATA_MARKERS.iter().any(|m| upper.contains(m));
        if is_metadata_statement || touches_catalog {
            ctx.flag_with_suggestion(
                "statement inspects database metadata/catalog tables",
                Some("serve schema metadata from application config, not live catalog queries")
            );
        }
    }
}

impl Rule for MetadataStatement {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:           "SEC013",
            name:         "Metadata/catalog access",
            category:     RuleCategory::Security,
            default_risk: RiskLevel::Medium
        }
    }

    fn strategy(&self) -> ViolationStrategy {
        self.strategy
    }
}

/// A `SET` statement altering session or server configuration
/// (`SET GLOBAL ...`, `SET @@...`, `SET ROLE ...`).
pub struct SetStatement {
    strategy: ViolationStrategy
}

impl SetStatement {
    pub fn new(strategy: ViolationStrategyConfig, default: ViolationStrategy) -> Self {
        Self {
            strategy: strategy.resolve(default)
        }
    }
}

impl StatementVisitor for SetStatement {
    fn visit_any(&self, sql: &str, ctx: &mut RuleCtx<'_>) {
        let upper = sql.trim_start().to_uppercase();
        if upper.starts_with("SET ") {
            let risk_level = if upper.starts_with("SET GLOBAL") || upper.contains("@@GLOBAL") {
                RiskLevel::Critical
            } else {
                RiskLevel::Medium
            };
            ctx.flag_override(
                risk_level,
                format!("SET statement changes {} state", describe_set_scope(risk_level)),
                Some("scope configuration changes through migrations or connection setup, not ad-hoc SET")
            );
        }
    }
}

fn describe_set_scope(risk_level: RiskLevel) -> &'static str {
    match risk_level {
        RiskLevel::Critical => "server-global",
        _ => "session"
    }
}

impl Rule for SetStatement {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:           "SEC014",
            name:         "SET statement",
            category:     RuleCategory::Security,
            default_risk: RiskLevel::Medium
        }
    }

    fn strategy(&self) -> ViolationStrategy {
        self.strategy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{context::SqlContext, parser::SqlDialect, result::ValidationResult, rules::dispatch};

    fn check(rule: &dyn Rule, sql: &str) -> ValidationResult {
        let ctx = SqlContext::new(sql, SqlDialect::Generic).unwrap();
        let mut result = ValidationResult::new();
        dispatch(rule, &ctx, &mut result);
        result
    }

    fn strategy_rule<R>(ctor: impl FnOnce(ViolationStrategyConfig, ViolationStrategy) -> R) -> R {
        ctor(ViolationStrategyConfig::Inherit, ViolationStrategy::Block)
    }

    #[test]
    fn dummy_condition_detects_1_equals_1() {
        let rule = strategy_rule(DummyCondition::new);
        let result = check(&rule, "SELECT * FROM users WHERE 1=1");
        assert!(!result.passed());
        assert_eq!(result.risk_level(), RiskLevel::High);
    }

    #[test]
    fn dummy_condition_allows_real_predicate() {
        let rule = strategy_rule(DummyCondition::new);
        let result = check(&rule, "SELECT * FROM users WHERE id = 42");
        assert!(result.passed());
    }

    #[test]
    fn dummy_condition_detects_matching_string_literals() {
        let rule = strategy_rule(DummyCondition::new);
        let result = check(&rule, "SELECT * FROM users WHERE 'a' = 'a'");
        assert!(!result.passed());
    }

    #[test]
    fn blacklist_field_flags_denied_column() {
        let rule = BlacklistField::new(
            vec![Pattern::compile("password_hash").unwrap()],
            ViolationStrategyConfig::Inherit,
            ViolationStrategy::Block
        );
        let result = check(&rule, "SELECT id FROM users WHERE password_hash = 'x'");
        assert!(!result.passed());
        assert_eq!(result.risk_level(), RiskLevel::Critical);
    }

    #[test]
    fn whitelist_field_flags_non_whitelisted_column() {
        let rule = WhitelistField::new(
            vec![Pattern::compile("id").unwrap()],
            ViolationStrategyConfig::Inherit,
            ViolationStrategy::Block
        );
        let result = check(&rule, "SELECT * FROM users WHERE email = 'a@b.com'");
        assert!(!result.passed());
        assert_eq!(result.risk_level(), RiskLevel::High);
    }

    #[test]
    fn whitelist_field_empty_list_disables_rule() {
        let rule = WhitelistField::new(vec![], ViolationStrategyConfig::Inherit, ViolationStrategy::Block);
        let result = check(&rule, "SELECT * FROM users WHERE email = 'a@b.com'");
        assert!(result.passed());
    }

    #[test]
    fn denied_table_flags_matching_table() {
        let rule = DeniedTable::new(
            vec![Pattern::compile("secrets").unwrap()],
            ViolationStrategyConfig::Inherit,
            ViolationStrategy::Block
        );
        let result = check(&rule, "SELECT * FROM secrets");
        assert!(!result.passed());
        assert_eq!(result.risk_level(), RiskLevel::Critical);
    }

    #[test]
    fn read_only_table_flags_update() {
        let rule = ReadOnlyTable::new(
            vec![Pattern::compile("audit_log").unwrap()],
            ViolationStrategyConfig::Inherit,
            ViolationStrategy::Block
        );
        let result = check(&rule, "UPDATE audit_log SET note = 'x' WHERE id = 1");
        assert!(!result.passed());
        assert_eq!(result.risk_level(), RiskLevel::Critical);
    }

    #[test]
    fn multi_statement_flags_stacked_queries() {
        let rule = strategy_rule(MultiStatement::new);
        let result = check(&rule, "SELECT 1; DROP TABLE users;");
        assert!(!result.passed());
        assert_eq!(result.risk_level(), RiskLevel::Critical);
    }

    #[test]
    fn multi_statement_ignores_semicolon_inside_string() {
        let rule = strategy_rule(MultiStatement::new);
        let result = check(&rule, "SELECT 'a;b' FROM users");
        assert!(result.passed());
    }

    #[test]
    fn set_operation_flags_union() {
        let rule = strategy_rule(SetOperation::new);
        let result = check(
            &rule,
            "SELECT id FROM users UNION SELECT id FROM admins"
        );
        assert!(!result.passed());
        assert_eq!(result.risk_level(), RiskLevel::High);
    }

    #[test]
    fn sql_comment_flags_double_dash() {
        let rule = strategy_rule(SqlComment::new);
        let result = check(&rule, "SELECT * FROM users -- WHERE id = 1");
        assert!(!result.passed());
    }

    #[test]
    fn sql_comment_ignores_marker_inside_string() {
        let rule = strategy_rule(SqlComment::new);
        let result = check(&rule, "SELECT * FROM users WHERE note = 'a -- b'");
        assert!(result.passed());
    }

    #[test]
    fn into_outfile_flags_file_write() {
        let rule = strategy_rule(IntoOutfile::new);
        let result = check(&rule, "SELECT * FROM users INTO OUTFILE '/tmp/x.csv'");
        assert!(!result.passed());
        assert_eq!(result.risk_level(), RiskLevel::Critical);
    }

    #[test]
    fn ddl_operation_flags_drop_table() {
        let rule = strategy_rule(DdlOperation::new);
        let result = check(&rule, "DROP TABLE users");
        assert!(!result.passed());
        assert_eq!(result.risk_level(), RiskLevel::Critical);
    }

    #[test]
    fn dangerous_function_flags_sleep() {
        let rule = strategy_rule(DangerousFunction::new);
        let result = check(&rule, "SELECT * FROM users WHERE id = sleep(5)");
        assert!(!result.passed());
        assert_eq!(result.risk_level(), RiskLevel::High);
    }

    #[test]
    fn call_execute_flags_stored_procedure() {
        let rule = strategy_rule(CallExecute::new);
        let result = check(&rule, "CALL reset_passwords()");
        assert!(!result.passed());
        assert_eq!(result.risk_level(), RiskLevel::High);
    }

    #[test]
    fn call_execute_names_the_procedure() {
        let rule = strategy_rule(CallExecute::new);
        let result = check(&rule, "CALL sp_drop_users()");
        assert!(!result.passed());
        assert_eq!(result.violations[0].message, "Stored procedure invocation: sp_drop_users");
    }

    #[test]
    fn metadata_statement_flags_information_schema() {
        let rule = strategy_rule(MetadataStatement::new);
        let result = check(&rule, "SELECT * FROM information_schema.tables");
        assert!(!result.passed());
        assert_eq!(result.risk_level(), RiskLevel::Medium);
    }

    #[test]
    fn set_statement_flags_set_global() {
        let rule = strategy_rule(SetStatement::new);
        let result = check(&rule, "SET GLOBAL max_connections = 10000");
        assert!(!result.passed());
        assert_eq!(result.risk_level(), RiskLevel::Critical);
    }

    #[test]
    fn set_statement_flags_session_scope_as_medium() {
        let rule = strategy_rule(SetStatement::new);
        let result = check(&rule, "SET search_path = public");
        assert!(!result.passed());
        assert_eq!(result.risk_level(), RiskLevel::Medium);
    }
}
