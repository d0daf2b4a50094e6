use sql_safety_guard::{
    config::GuardConfig, parser::SqlDialect, result::RiskLevel, strategy::ViolationStrategy,
    validator::DefaultValidator
};

fn violated_rule_ids(sql: &str) -> Vec<&'static str> {
    let validator = DefaultValidator::new(&GuardConfig::default()).unwrap();
    let result = validator.validate(sql, SqlDialect::Generic);
    result.violations.iter().map(|v| v.rule_id).collect()
}

#[test]
fn update_without_where_is_flagged() {
    let ids = violated_rule_ids("UPDATE users SET status = 'inactive'");
    assert!(ids.contains(&"OP001"));
}

#[test]
fn update_with_where_is_clean() {
    let ids = violated_rule_ids("UPDATE users SET status = 'inactive' WHERE id = 1");
    assert!(!ids.contains(&"OP001"));
}

#[test]
fn delete_without_where_is_flagged() {
    let ids = violated_rule_ids("DELETE FROM users");
    assert!(ids.contains(&"OP001"));
}

#[test]
fn select_without_limit_is_flagged() {
    let ids = violated_rule_ids("SELECT * FROM users");
    assert!(ids.contains(&"OP002"));
}

#[test]
fn select_with_limit_and_order_by_is_clean_of_pagination_rules() {
    let ids = violated_rule_ids("SELECT id FROM users ORDER BY id LIMIT 10");
    assert!(!ids.contains(&"OP002"));
    assert!(!ids.contains(&"OP006"));
}

#[test]
fn deep_offset_past_default_threshold_is_flagged() {
    let ids = violated_rule_ids("SELECT id FROM users ORDER BY id LIMIT 20 OFFSET 50000");
    assert!(ids.contains(&"OP003"));
}

#[test]
fn paginated_select_without_order_by_is_flagged() {
    let ids = violated_rule_ids("SELECT id FROM users LIMIT 20 OFFSET 40");
    assert!(ids.contains(&"OP006"));
}

#[test]
fn dummy_where_condition_is_flagged_critical() {
    let ids = violated_rule_ids("SELECT * FROM users WHERE 1=1");
    assert!(ids.contains(&"SEC001"));
}

#[test]
fn stacked_queries_are_flagged() {
    let ids = violated_rule_ids("SELECT * FROM users; DROP TABLE users;");
    assert!(ids.contains(&"SEC006"));
    assert!(ids.contains(&"SEC010"));
}

#[test]
fn inline_comment_outside_string_is_flagged() {
    let ids = violated_rule_ids("SELECT * FROM users -- WHERE id = 1");
    assert!(ids.contains(&"SEC008"));
}

#[test]
fn semicolon_inside_a_string_literal_is_not_a_stacked_query() {
    let ids = violated_rule_ids("SELECT 'a;b' FROM users LIMIT 10");
    assert!(!ids.contains(&"SEC006"));
}

#[test]
fn dangerous_function_call_is_flagged() {
    let ids = violated_rule_ids("SELECT * FROM users WHERE id = sleep(5)");
    assert!(ids.contains(&"SEC011"));
}

#[test]
fn ddl_statement_is_flagged() {
    let ids = violated_rule_ids("DROP TABLE users");
    assert!(ids.contains(&"SEC010"));
}

#[test]
fn denied_table_from_config_blocks() {
    let mut config = GuardConfig::default();
    config.tables.denied = vec!["secrets".into()];
    config.default_strategy = ViolationStrategy::Block;
    let validator = DefaultValidator::new(&config).unwrap();
    let result = validator.validate("SELECT * FROM secrets LIMIT 10", SqlDialect::Generic);
    assert!(result.violations.iter().any(|v| v.rule_id == "SEC004"));
}

#[test]
fn read_only_table_write_blocks() {
    let mut config = GuardConfig::default();
    config.tables.read_only = vec!["audit_log".into()];
    let validator = DefaultValidator::new(&config).unwrap();
    let result = validator.validate("DELETE FROM audit_log WHERE id = 1", SqlDialect::Generic);
    assert!(result.violations.iter().any(|v| v.rule_id == "SEC005"));
}

#[test]
fn clean_select_has_no_violations_at_all() {
    let result = DefaultValidator::new(&GuardConfig::default())
        .unwrap()
        .validate("SELECT id, name FROM users WHERE id = 1 ORDER BY id LIMIT 10", SqlDialect::Generic);
    assert!(result.passed());
}

#[test]
fn insert_with_blacklisted_column_is_flagged() {
    let mut config = GuardConfig::default();
    config.fields.blacklist = vec!["password_hash".into()];
    let validator = DefaultValidator::new(&config).unwrap();
    let result = validator.validate(
        "INSERT INTO users (id, password_hash) VALUES (1, 'x')",
        SqlDialect::Generic
    );
    assert!(result.violations.iter().any(|v| v.rule_id == "SEC002"));
}

#[test]
fn update_without_where_is_critical() {
    let result = DefaultValidator::new(&GuardConfig::default())
        .unwrap()
        .validate("UPDATE users SET name = 'x'", SqlDialect::Generic);
    assert!(!result.passed());
    assert_eq!(result.risk_level(), RiskLevel::Critical);
}

#[test]
fn delete_with_where_passes() {
    let result = DefaultValidator::new(&GuardConfig::default())
        .unwrap()
        .validate("DELETE FROM users WHERE id = 1", SqlDialect::Generic);
    assert!(result.passed());
}

#[test]
fn select_star_without_where_or_pagination_is_critical() {
    let result = DefaultValidator::new(&GuardConfig::default())
        .unwrap()
        .validate("SELECT * FROM users", SqlDialect::Generic);
    assert!(!result.passed());
    assert_eq!(result.risk_level(), RiskLevel::Critical);
    assert!(result.violations.iter().any(|v| v.rule_id == "OP002"
        && v.message == "SELECT without WHERE and without pagination"));
}

#[test]
fn select_with_only_blacklisted_where_and_no_pagination_is_high() {
    let mut config = GuardConfig::default();
    config.fields.blacklist = vec!["deleted".into(), "status".into()];
    let validator = DefaultValidator::new(&config).unwrap();
    let result = validator.validate("SELECT * FROM users WHERE deleted = 0", SqlDialect::Generic);
    assert!(!result.passed());
    assert_eq!(result.risk_level(), RiskLevel::High);
    assert!(result.violations.iter().any(|v| v.rule_id == "OP002"
        && v.message == "WHERE uses only blacklist fields without pagination"));
}

#[test]
fn select_with_ordinary_where_passes() {
    let result = DefaultValidator::new(&GuardConfig::default())
        .unwrap()
        .validate("SELECT id, name FROM users WHERE id = 1", SqlDialect::Generic);
    assert!(result.passed());
}

#[test]
fn stored_procedure_call_names_the_procedure_at_high_risk() {
    let result = DefaultValidator::new(&GuardConfig::default())
        .unwrap()
        .validate("CALL sp_drop_users()", SqlDialect::Generic);
    assert!(!result.passed());
    assert_eq!(result.risk_level(), RiskLevel::High);
    assert!(result
        .violations
        .iter()
        .any(|v| v.rule_id == "SEC012" && v.message == "Stored procedure invocation: sp_drop_users"));
}

#[test]
fn stacked_ddl_query_is_critical_overall() {
    let result = DefaultValidator::new(&GuardConfig::default())
        .unwrap()
        .validate("SELECT * FROM users; DROP TABLE users", SqlDialect::Generic);
    assert!(!result.passed());
    assert_eq!(result.risk_level(), RiskLevel::Critical);
    assert!(result.violations.iter().any(|v| v.rule_id == "SEC006"));
    assert!(result.violations.iter().any(|v| v.rule_id == "SEC010"));
}
