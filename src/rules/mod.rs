//! The rule framework: [`StatementVisitor`] is the template-method contract
//! every concrete rule implements; [`Rule`] adds the identity a rule needs
//! to be registered, configured, and reported on; [`RuleCtx`] is the
//! explicit per-call state threaded into each visit instead of a
//! thread-local stack (contrast with the cross-boundary thread-local slot
//! in [`crate::hooks`], which genuinely needs to outlive a single
//! `validate` call and so keeps the thread-local form).

pub mod operational;
pub mod security;

use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::warn;

pub use crate::result::RuleCategory;
use crate::{
    context::SqlContext,
    parser::{
        ParsedStatement,
        statements::{DeleteStatement, InsertStatement, SelectStatement, UpdateStatement}
    },
    result::{RiskLevel, ValidationResult, Violation},
    strategy::ViolationStrategy
};

/// Static identity of a rule, independent of any particular invocation.
#[derive(Debug, Clone, Copy)]
pub struct RuleInfo {
    pub id:           &'static str,
    pub name:         &'static str,
    pub category:     RuleCategory,
    pub default_risk: RiskLevel
}

/// Per-invocation state passed into each `visit_*` call. A rule records a
/// violation by calling [`RuleCtx::flag`] / [`RuleCtx::flag_with_suggestion`];
/// the dispatcher collects whatever was recorded once the call returns.
pub struct RuleCtx<'a> {
    info:       RuleInfo,
    strategy:   ViolationStrategy,
    context:    &'a SqlContext,
    violations: Vec<Violation>
}

impl<'a> RuleCtx<'a> {
    fn new(info: RuleInfo, strategy: ViolationStrategy, context: &'a SqlContext) -> Self {
        Self {
            info,
            strategy,
            context,
            violations: Vec::new()
        }
    }

    pub fn sql(&self) -> &str {
        self.context.sql()
    }

    /// The full context being validated: dialect, layer, bound parameters.
    /// Rules that only need the current statement's facts should prefer the
    /// narrowly-typed argument the visit method already gives them; this is
    /// for rules that need something outside that, like a pagination
    /// parameter or the execution layer.
    pub fn context(&self) -> &SqlContext {
        self.context
    }

    pub fn flag(&mut self, message: impl Into<String>) {
        self.flag_with_suggestion::<String>(message, None);
    }

    pub fn flag_with_suggestion<S: Into<String>>(
        &mut self,
        message: impl Into<String>,
        suggestion: Option<S>
    ) {
        self.flag_override(self.info.default_risk, message, suggestion);
    }

    /// Like [`RuleCtx::flag_with_suggestion`] but for rules whose risk
    /// varies by call site instead of being fixed per rule (stratified
    /// pagination checks, SET-statement scope detection).
    pub fn flag_override<S: Into<String>>(
        &mut self,
        risk_level: RiskLevel,
        message: impl Into<String>,
        suggestion: Option<S>
    ) {
        self.violations.push(Violation {
            rule_id: self.info.id,
            rule_name: self.info.name,
            message: message.into(),
            risk_level,
            category: self.info.category,
            suggestion: suggestion.map(Into::into),
            strategy: self.strategy
        });
    }

    fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

/// Template method contract for a rule: each visit method gets the
/// narrowly-typed facts for one statement kind and flags violations on the
/// [`RuleCtx`] it's given. All methods default to doing nothing, so a rule
/// only implements the kinds it actually cares about.
///
/// `visit_any` is the exception: it runs unconditionally, in addition to
/// whichever kind-specific method matched, because several security rules
/// (multi-statement, inline comment, dangerous-function scans) need to see
/// the raw SQL text regardless of whether it parsed into a classifiable
/// statement at all.
pub trait StatementVisitor: Send + Sync {
    fn visit_select(&self, _stmt: &SelectStatement, _ctx: &mut RuleCtx<'_>) {}

    fn visit_update(&self, _stmt: &UpdateStatement, _ctx: &mut RuleCtx<'_>) {}

    fn visit_delete(&self, _stmt: &DeleteStatement, _ctx: &mut RuleCtx<'_>) {}

    fn visit_insert(&self, _stmt: &InsertStatement, _ctx: &mut RuleCtx<'_>) {}

    fn visit_any(&self, _sql: &str, _ctx: &mut RuleCtx<'_>) {}
}

/// A registered, configured rule.
pub trait Rule: StatementVisitor {
    fn info(&self) -> RuleInfo;

    /// The treatment a violation of this rule calls for. Resolved (never
    /// `Inherit`) by the time a rule is constructed by
    /// [`crate::validator::DefaultValidator`].
    fn strategy(&self) -> ViolationStrategy;
}

/// Run a single rule against `ctx`, appending any violations it raises to
/// `result`. A panicking rule is absorbed: the panic is caught, logged, and
/// treated as "this rule found nothing" so the remaining rules still run.
pub fn dispatch(rule: &dyn Rule, ctx: &SqlContext, result: &mut ValidationResult) {
    let info = rule.info();
    let strategy = rule.strategy();
    let sql = ctx.sql();

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let mut rctx = RuleCtx::new(info, strategy, ctx);
        match ctx.statement() {
            ParsedStatement::Select(s) => rule.visit_select(s, &mut rctx),
            ParsedStatement::Insert(s) => rule.visit_insert(s, &mut rctx),
            ParsedStatement::Update(s) => rule.visit_update(s, &mut rctx),
            ParsedStatement::Delete(s) => rule.visit_delete(s, &mut rctx),
            ParsedStatement::Unparsed => {}
        }
        rule.visit_any(sql, &mut rctx);
        rctx.into_violations()
    }));

    match outcome {
        Ok(violations) => {
            for v in violations {
                result.push(v);
            }
        }
        Err(_) => {
            warn!(
                rule_id = info.id,
                sql, "rule panicked during validation; treating as no violation"
            );
        }
    }
}
