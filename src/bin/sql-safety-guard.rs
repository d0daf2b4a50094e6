//! Demo CLI host: wires [`sql_safety_guard::config::GuardConfig`] into a
//! [`sql_safety_guard::validator::DefaultValidator`] and runs it over a SQL
//! file, printing the validation outcome and exiting with a code that
//! reflects the effective strategy.
//!
//! This binary exists to demonstrate the `SqlContext` -> `validate` ->
//! strategy pipeline end-to-end; the library crate is the actual product.

use std::{
    fs::read_to_string,
    io::{self, Read},
    process
};

use clap::Parser;
use colored::Colorize;
use sql_safety_guard::{
    cli::{Cli, Commands, Format},
    config::GuardConfig,
    error::{AppResult, file_read_error},
    result::{RiskLevel, ValidationResult},
    validator::DefaultValidator
};

fn main() {
    match run() {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn run() -> AppResult<i32> {
    let cli = Cli::parse();
    let config = GuardConfig::load()?;

    match cli.command {
        Commands::Check {
            sql,
            dialect,
            output_format,
            no_color
        } => {
            let sql_text = if sql.to_str() == Some("-") {
                let mut buffer = String::new();
                io::stdin()
                    .read_to_string(&mut buffer)
                    .map_err(|e| file_read_error("stdin", e))?;
                buffer
            } else {
                read_to_string(&sql).map_err(|e| file_read_error(&sql.display().to_string(), e))?
            };

            let validator = DefaultValidator::new(&config)?;
            let result = validator.validate(&sql_text, dialect.into_sql_dialect());

            match output_format {
                Format::Text => print_text(&result, !no_color),
                Format::Json => print_json(&result)?
            }

            Ok(exit_code_for(&result))
        }
    }
}

fn print_text(result: &ValidationResult, colored: bool) {
    if result.passed() {
        let line = "no violations found";
        println!("{}", if colored { line.green().to_string() } else { line.to_string() });
        return;
    }

    println!(
        "{} violation(s), highest risk: {}",
        result.violations.len(),
        result.risk_level()
    );
    for v in &result.violations {
        let header = format!("[{}] {} ({})", v.rule_id, v.rule_name, v.risk_level);
        let header = if colored {
            match v.risk_level {
                RiskLevel::Critical | RiskLevel::High => header.red().to_string(),
                RiskLevel::Medium => header.yellow().to_string(),
                _ => header.to_string()
            }
        } else {
            header
        };
        println!("{header}\n  {}", v.message);
        if let Some(suggestion) = &v.suggestion {
            println!("  suggestion: {suggestion}");
        }
    }
}

fn print_json(result: &ValidationResult) -> AppResult<()> {
    let json = serde_json::to_string_pretty(result)
        .map_err(|e| sql_safety_guard::error::config_error(format!("failed to serialize result: {e}")))?;
    println!("{json}");
    Ok(())
}

/// `0` when nothing blocks, `1` when the worst violation only calls for
/// log/warn treatment, `2` when at least one violation's effective
/// strategy is block.
fn exit_code_for(result: &ValidationResult) -> i32 {
    use sql_safety_guard::strategy::ViolationStrategy;

    match result.violations.iter().map(|v| v.strategy).max() {
        None => 0,
        Some(ViolationStrategy::Block) => 2,
        Some(ViolationStrategy::Warn) | Some(ViolationStrategy::Log) => 1
    }
}
