//! Runs the configured rule catalog against a [`SqlContext`] in a fixed
//! order, collecting every violation into one [`ValidationResult`].

use crate::{context::SqlContext, result::ValidationResult, rules::{Rule, dispatch}};

/// An ordered, immutable set of rules. Order only matters for violation
/// ordering in the final result — each rule's outcome is independent of
/// every other rule's.
pub struct RuleOrchestrator {
    rules: Vec<Box<dyn Rule>>
}

impl RuleOrchestrator {
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self {
            rules
        }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Run every registered rule against `ctx`, appending violations to
    /// `result` in registration order.
    pub fn run(&self, ctx: &SqlContext, result: &mut ValidationResult) {
        for rule in &self.rules {
            dispatch(rule.as_ref(), ctx, result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        parser::SqlDialect,
        rules::operational::MissingWhereOnWrite,
        strategy::{ViolationStrategy, ViolationStrategyConfig}
    };

    #[test]
    fn runs_every_registered_rule() {
        let orchestrator = RuleOrchestrator::new(vec![Box::new(MissingWhereOnWrite::new(
            ViolationStrategyConfig::Inherit,
            ViolationStrategy::Block
        ))]);
        let ctx = SqlContext::new("DELETE FROM sessions", SqlDialect::Generic).unwrap();
        let mut result = ValidationResult::new();
        orchestrator.run(&ctx, &mut result);
        assert_eq!(result.violations.len(), 1);
    }

    #[test]
    fn empty_catalog_always_passes() {
        let orchestrator = RuleOrchestrator::new(vec![]);
        let ctx = SqlContext::new("DROP TABLE users", SqlDialect::Generic).unwrap();
        let mut result = ValidationResult::new();
        orchestrator.run(&ctx, &mut result);
        assert!(result.passed());
    }
}
