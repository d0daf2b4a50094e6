//! Result types produced by a validation run: [`RiskLevel`], [`Violation`],
//! and the aggregate [`ValidationResult`].

use serde::Serialize;

use crate::strategy::ViolationStrategy;

/// Overall risk a validated statement carries, ordered from safest to most
/// dangerous so the maximum over a set of violations is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum RiskLevel {
    Safe,
    Low,
    Medium,
    High,
    Critical
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Safe => write!(f, "SAFE"),
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::Critical => write!(f, "CRITICAL")
        }
    }
}

/// Grouping used to organize rules; mirrors the operational/security split
/// the rule catalog is divided into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RuleCategory {
    Operational,
    Security
}

impl std::fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Operational => write!(f, "Operational"),
            Self::Security => write!(f, "Security")
        }
    }
}

/// A single rule violation surfaced while validating one statement.
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub rule_id:     &'static str,
    pub rule_name:   &'static str,
    pub message:     String,
    pub risk_level:  RiskLevel,
    pub category:    RuleCategory,
    pub suggestion:  Option<String>,
    /// The treatment this violation calls for, resolved from the owning
    /// rule's configured strategy (never [`ViolationStrategy::Inherit`] by
    /// the time it lands here — resolution happens at rule construction).
    pub strategy:    ViolationStrategy
}

/// Outcome of validating one [`crate::context::SqlContext`].
///
/// `risk_level()` is the maximum risk across all violations (`Safe` when
/// there are none); `passed()` is shorthand for "no violations at all".
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub violations: Vec<Violation>
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            violations: Vec::new()
        }
    }

    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.violations
            .iter()
            .map(|v| v.risk_level)
            .max()
            .unwrap_or(RiskLevel::Safe)
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}
