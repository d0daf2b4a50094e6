use sql_safety_guard::{
    config::GuardConfig,
    strategy::{ViolationStrategy, ViolationStrategyConfig}
};

#[test]
fn default_config_has_warn_strategy() {
    let config = GuardConfig::default();
    assert_eq!(config.default_strategy, ViolationStrategy::Warn);
    assert!(config.tables.denied.is_empty());
    assert!(config.tables.read_only.is_empty());
    assert!(config.fields.blacklist.is_empty());
    assert!(config.rules.is_empty());
}

#[test]
fn default_config_thresholds() {
    let config = GuardConfig::default();
    assert_eq!(config.max_offset, 10_000);
    assert_eq!(config.max_page_size, 500);
}

#[test]
fn unconfigured_rule_inherits_default() {
    let config = GuardConfig::default();
    assert_eq!(config.strategy_for("OP001"), ViolationStrategyConfig::Inherit);
}

#[test]
fn config_load_never_errors_without_a_config_file() {
    let result = GuardConfig::load();
    assert!(result.is_ok());
}

#[test]
fn full_toml_document_round_trips() {
    let toml = r#"
        default_strategy = "block"
        max_offset = 2000
        max_page_size = 50

        [tables]
        denied = ["secrets", "internal_*"]
        read_only = ["audit_log"]

        [fields]
        blacklist = ["password_hash", "ssn"]
        whitelist = []

        [rules.SEC006]
        strategy = "block"

        [rules.OP002]
        strategy = "log"
    "#;
    let config: GuardConfig = toml::from_str(toml).unwrap();
    assert_eq!(config.default_strategy, ViolationStrategy::Block);
    assert_eq!(config.max_offset, 2000);
    assert_eq!(config.max_page_size, 50);
    assert_eq!(config.tables.denied.len(), 2);
    assert_eq!(config.strategy_for("SEC006"), ViolationStrategyConfig::Block);
    assert_eq!(config.strategy_for("OP002"), ViolationStrategyConfig::Log);
}
