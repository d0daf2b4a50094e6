//! Configuration loading and management.
//!
//! Configuration is loaded from a TOML file with the following precedence
//! (highest to lowest):
//!
//! 1. `.sql-safety-guard.toml` in the current directory
//! 2. `~/.config/sql-safety-guard/config.toml`
//! 3. Default values
//!
//! # Configuration File Format
//!
//! ```toml
//! default_strategy = "warn"    # log, warn, block
//! max_offset = 10000
//! max_page_size = 500
//! enforce_for_all_queries = false
//!
//! [tables]
//! denied = ["secrets", "internal_*"]
//! read_only = ["audit_log"]
//!
//! [fields]
//! blacklist = ["password_hash", "ssn"]
//! whitelist = []
//!
//! [pagination]
//! whitelisted_tables = ["reference_data"]
//! whitelisted_statement_ids = ["reports.exportAll"]
//!
//! [rules.SEC006]
//! strategy = "block"
//!
//! [rules.OP002]
//! strategy = "log"
//! ```

use std::{collections::HashMap, env, fs, path::PathBuf};

use serde::Deserialize;

use crate::{
    error::{AppResult, config_error},
    strategy::ViolationStrategy
};

/// Top-level guard configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GuardConfig {
    /// Treatment a rule falls back to when its own entry under `[rules.*]`
    /// is absent or set to `inherit`.
    #[serde(default = "default_strategy")]
    pub default_strategy: ViolationStrategy,
    #[serde(default = "default_max_offset")]
    pub max_offset:       u64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size:    u64,
    /// When true, a `SELECT` that is paginated but has nothing else worth
    /// flagging about its `WHERE` clause still gets a low-severity nudge
    /// from `OP002` rather than passing silently.
    #[serde(default)]
    pub enforce_for_all_queries: bool,
    #[serde(default)]
    pub tables:           TableConfig,
    #[serde(default)]
    pub fields:           FieldConfig,
    #[serde(default)]
    pub pagination:       PaginationConfig,
    /// Per-rule strategy overrides, keyed by rule ID (`"OP001"`, `"SEC006"`, ...).
    #[serde(default)]
    pub rules:            HashMap<String, RuleOverride>
}

fn default_strategy() -> ViolationStrategy {
    ViolationStrategy::Warn
}

fn default_max_offset() -> u64 {
    10_000
}

fn default_max_page_size() -> u64 {
    500
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            default_strategy: default_strategy(),
            max_offset:       default_max_offset(),
            max_page_size:    default_max_page_size(),
            enforce_for_all_queries: false,
            tables:           TableConfig::default(),
            fields:           FieldConfig::default(),
            pagination:       PaginationConfig::default(),
            rules:            HashMap::new()
        }
    }
}

/// Table allow/deny policy.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TableConfig {
    #[serde(default)]
    pub denied:    Vec<String>,
    #[serde(default)]
    pub read_only: Vec<String>
}

/// Column allow/deny policy.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FieldConfig {
    #[serde(default)]
    pub blacklist: Vec<String>,
    /// Empty disables whitelist enforcement entirely.
    #[serde(default)]
    pub whitelist: Vec<String>
}

/// Tables and caller-supplied statement ids that are exempt from the
/// missing-pagination check entirely, because a host already knows these
/// queries are meant to return an unbounded set (small reference tables,
/// known full-export reports).
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PaginationConfig {
    #[serde(default)]
    pub whitelisted_tables:        Vec<String>,
    #[serde(default)]
    pub whitelisted_statement_ids: Vec<String>
}

/// Per-rule strategy override. A missing entry, or one whose `strategy` is
/// `inherit`, falls back to [`GuardConfig::default_strategy`].
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RuleOverride {
    #[serde(default)]
    pub strategy: crate::strategy::ViolationStrategyConfig
}

impl GuardConfig {
    /// Resolve the configured strategy for a rule ID against
    /// [`GuardConfig::default_strategy`].
    pub fn strategy_for(&self, rule_id: &str) -> crate::strategy::ViolationStrategyConfig {
        self.rules
            .get(rule_id)
            .map(|r| r.strategy)
            .unwrap_or_default()
    }

    /// Load configuration, preferring `.sql-safety-guard.toml` in the
    /// current directory over `~/.config/sql-safety-guard/config.toml`,
    /// falling back to defaults when neither exists.
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(home) = env::var_os("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("sql-safety-guard")
                .join("config.toml");
            if home_config.exists() {
                config = Self::read_from(&home_config)?;
            }
        }

        let local_config = PathBuf::from(".sql-safety-guard.toml");
        if local_config.exists() {
            config = Self::read_from(&local_config)?;
        }

        Ok(config)
    }

    fn read_from(path: &PathBuf) -> AppResult<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| config_error(format!("failed to read config file: {e}")))?;
        toml::from_str(&content).map_err(|e| config_error(format!("invalid config file: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::ViolationStrategyConfig;

    #[test]
    fn default_config_has_sane_thresholds() {
        let config = GuardConfig::default();
        assert_eq!(config.default_strategy, ViolationStrategy::Warn);
        assert_eq!(config.max_offset, 10_000);
        assert_eq!(config.max_page_size, 500);
        assert!(config.tables.denied.is_empty());
        assert!(config.fields.whitelist.is_empty());
        assert!(!config.enforce_for_all_queries);
        assert!(config.pagination.whitelisted_tables.is_empty());
    }

    #[test]
    fn parses_full_toml_document() {
        let toml = r#"
            default_strategy = "block"
            max_offset = 5000
            max_page_size = 200

            [tables]
            denied = ["secrets"]
            read_only = ["audit_log"]

            [fields]
            blacklist = ["password_hash"]

            [pagination]
            whitelisted_tables = ["reference_data"]
            whitelisted_statement_ids = ["reports.exportAll"]

            [rules.OP002]
            strategy = "log"
        "#;
        let config: GuardConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.default_strategy, ViolationStrategy::Block);
        assert_eq!(config.max_offset, 5000);
        assert_eq!(config.tables.denied, vec!["secrets".to_string()]);
        assert_eq!(config.pagination.whitelisted_tables, vec!["reference_data".to_string()]);
        assert_eq!(config.strategy_for("OP002"), ViolationStrategyConfig::Log);
        assert_eq!(config.strategy_for("OP003"), ViolationStrategyConfig::Inherit);
    }
}
