use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::parser::SqlDialect;

/// SQL Safety Guard - validate SQL statements against an operational and
/// security rule catalog before they execute
#[derive(Parser, Debug)]
#[command(name = "sql-safety-guard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a single SQL statement against the configured rule catalog
    Check {
        /// Path to a file containing the SQL statement to check (use - for stdin)
        #[arg(short, long)]
        sql: PathBuf,

        /// SQL dialect to parse the statement under
        #[arg(long, value_enum, default_value = "generic")]
        dialect: Dialect,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        output_format: Format,

        /// Disable colored output
        #[arg(long)]
        no_color: bool
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Dialect {
    Generic,
    Mysql,
    Postgresql,
    Sqlite,
    Clickhouse
}

impl Dialect {
    pub fn into_sql_dialect(self) -> SqlDialect {
        match self {
            Self::Generic => SqlDialect::Generic,
            Self::Mysql => SqlDialect::MySQL,
            Self::Postgresql => SqlDialect::PostgreSQL,
            Self::Sqlite => SqlDialect::SQLite,
            Self::Clickhouse => SqlDialect::ClickHouse
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    Text,
    Json
}
