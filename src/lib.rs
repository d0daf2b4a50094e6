//! # SQL Safety Guard
//!
//! An in-process SQL validation library: parse a statement, classify it,
//! run it through a catalog of operational and security rules, and resolve
//! the outcome into log/warn/block treatment before a host executes it.
//!
//! # Architecture
//!
//! 1. [`parser`] classifies raw SQL text into a [`parser::ParsedStatement`]
//!    via `sqlparser`, never failing — unparseable or multi-statement input
//!    becomes [`parser::ParsedStatement::Unparsed`] rather than an error.
//! 2. [`context`] wraps a parsed statement, its dialect, execution layer,
//!    and any bound parameters into an immutable [`context::SqlContext`].
//! 3. [`rules`] defines the [`rules::StatementVisitor`]/[`rules::Rule`]
//!    contract every rule implements, plus [`rules::dispatch`], which runs
//!    one rule against a context and absorbs a panicking rule rather than
//!    letting it take down the whole validation.
//! 4. [`orchestrator`] runs every configured rule in a fixed order,
//!    collecting violations into one [`result::ValidationResult`].
//! 5. [`strategy`] resolves a result's most severe violation strategy and
//!    either logs, warns, or raises [`error::SqlSafetyViolation`].
//! 6. [`validator`] ties the above together behind [`config::GuardConfig`],
//!    backed by [`cache`]'s process-wide parse cache and per-thread dedup
//!    filter.
//! 7. [`hooks`] gives a host pre-/post-execution integration points.
//!
//! # Quick Start
//!
//! ```no_run
//! use sql_safety_guard::{config::GuardConfig, parser::SqlDialect, validator::DefaultValidator};
//!
//! let config = GuardConfig::default();
//! let validator = DefaultValidator::new(&config).unwrap();
//! let result = validator.validate("DELETE FROM sessions", SqlDialect::Generic);
//! assert!(!result.passed());
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded from `.sql-safety-guard.toml` in the current
//! directory, falling back to `~/.config/sql-safety-guard/config.toml`,
//! falling back to defaults. See [`config::GuardConfig`] for the full shape.
//!
//! # Rule Catalog
//!
//! ## Operational rules (OP001-OP006)
//!
//! | ID | Name |
//! |----|------|
//! | OP001 | Missing WHERE on write |
//! | OP002 | Missing pagination on SELECT |
//! | OP003 | Deep pagination offset |
//! | OP004 | Logical pagination without LIMIT |
//! | OP005 | Large page size |
//! | OP006 | Pagination without ORDER BY |
//!
//! ## Security rules (SEC001-SEC014)
//!
//! | ID | Name |
//! |----|------|
//! | SEC001 | Dummy WHERE condition |
//! | SEC002 | Blacklisted field referenced |
//! | SEC003 | Field not on whitelist |
//! | SEC004 | Denied table |
//! | SEC005 | Write to read-only table |
//! | SEC006 | Multiple statements in one call |
//! | SEC007 | Set operation in SELECT |
//! | SEC008 | Inline SQL comment |
//! | SEC009 | File write via SELECT |
//! | SEC010 | DDL statement |
//! | SEC011 | Dangerous function call |
//! | SEC012 | Stored procedure invocation |
//! | SEC013 | Metadata/catalog access |
//! | SEC014 | SET statement |
//!
//! # Modules
//!
//! - [`context`] - the unit of work, [`context::SqlContext`]
//! - [`parser`] - dialect-aware SQL parsing and AST-fact extraction
//! - [`pattern`] - wildcard table/field match patterns
//! - [`cache`] - parse cache and per-thread dedup filter
//! - [`result`] - [`result::Violation`] and [`result::ValidationResult`]
//! - [`rules`] - the rule contract and the built-in rule catalog
//! - [`orchestrator`] - runs the configured rule catalog
//! - [`strategy`] - resolves violations into log/warn/block treatment
//! - [`validator`] - builds the rule catalog from config and validates
//! - [`hooks`] - pre-/post-execution integration points
//! - [`config`] - configuration loading
//! - [`error`] - error types and constructors
//! - [`cli`] - argument definitions for the demo CLI host

pub mod cache;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod hooks;
pub mod orchestrator;
pub mod parser;
pub mod pattern;
pub mod result;
pub mod rules;
pub mod strategy;
pub mod validator;
