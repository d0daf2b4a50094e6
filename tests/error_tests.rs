use sql_safety_guard::{
    error::{SqlSafetyViolation, config_error, file_read_error, query_parse_error},
    result::{RiskLevel, RuleCategory, Violation},
    strategy::ViolationStrategy
};

#[test]
fn file_read_error_mentions_path() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error = file_read_error("/path/to/file.sql", io_error);
    assert!(error.to_string().contains("/path/to/file.sql"));
}

#[test]
fn query_parse_error_surfaces_line_and_column() {
    let error = query_parse_error("Expected keyword at Line: 5, Column 10");
    assert!(error.to_string().contains("line 5"));
    assert!(error.to_string().contains("column 10"));
}

#[test]
fn query_parse_error_without_position_still_formats() {
    let error = query_parse_error("Unexpected token");
    assert!(error.to_string().contains("Unexpected token"));
}

#[test]
fn config_error_carries_message() {
    let error = config_error("invalid configuration value");
    assert!(error.to_string().contains("invalid configuration value"));
}

#[test]
fn sql_safety_violation_display_lists_every_violation() {
    let violation = Violation {
        rule_id: "OP001",
        rule_name: "Missing WHERE on write",
        message: "DELETE has no WHERE clause".into(),
        risk_level: RiskLevel::High,
        category: RuleCategory::Operational,
        suggestion: None,
        strategy: ViolationStrategy::Block
    };
    let err = SqlSafetyViolation::new("DELETE FROM sessions", RiskLevel::High, vec![violation])
        .with_statement_id("stmt-42");
    let rendered = err.to_string();
    assert!(rendered.starts_with("SQL validation failed: HIGH: "));
    assert!(rendered.contains("stmt-42"));
    assert!(rendered.contains("DELETE has no WHERE clause"));
}

#[test]
fn sql_safety_violation_display_joins_multiple_messages_with_semicolons() {
    let first = Violation {
        rule_id: "SEC006",
        rule_name: "Multiple statements in one call",
        message: "Multiple statements".into(),
        risk_level: RiskLevel::Critical,
        category: RuleCategory::Security,
        suggestion: None,
        strategy: ViolationStrategy::Block
    };
    let second = Violation {
        rule_id: "SEC010",
        rule_name: "DDL statement",
        message: "DDL operation".into(),
        risk_level: RiskLevel::Critical,
        category: RuleCategory::Security,
        suggestion: None,
        strategy: ViolationStrategy::Block
    };
    let err = SqlSafetyViolation::new(
        "SELECT * FROM users; DROP TABLE users",
        RiskLevel::Critical,
        vec![first, second]
    );
    assert_eq!(
        err.to_string(),
        "SQL validation failed: CRITICAL: Multiple statements; DDL operation"
    );
}
