//! Command-line argument parsing for td-query.
//!
//! Uses clap to parse the flags and the two required positional arguments
//! (database, table), then validates them into an immutable [`QueryConfig`].

use crate::config::{Engine, OutputFormat, QueryConfig};
use crate::error::{Result, TdqError, EXIT_USER_ERROR};
use clap::Parser;

/// Submit a query to a hosted analytics engine and fetch the result.
#[derive(Parser, Debug)]
#[command(name = "tdq")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format: tabular (stdout) or csv (file in the working directory)
    #[arg(short = 'f', long, value_name = "FORMAT", default_value = "tabular")]
    pub format: String,

    /// Comma-separated list of columns to select
    #[arg(short = 'c', long, value_name = "COLUMNS", default_value = "*")]
    pub columns: String,

    /// Limit the output to at most N rows
    #[arg(short = 'l', long, value_name = "N")]
    pub limit: Option<String>,

    /// Minimum time bound, epoch seconds
    #[arg(short = 'm', long, value_name = "EPOCH", allow_negative_numbers = true)]
    pub min: Option<String>,

    /// Maximum time bound, epoch seconds
    #[arg(short = 'M', long = "max", value_name = "EPOCH", allow_negative_numbers = true)]
    pub max: Option<String>,

    /// Execution engine: hive or presto
    #[arg(short = 'e', long, value_name = "ENGINE", default_value = "presto")]
    pub engine: String,

    /// Database to query
    #[arg(value_name = "DATABASE")]
    pub database: String,

    /// Table to query
    #[arg(value_name = "TABLE")]
    pub table: String,
}

impl Cli {
    /// Parses command-line arguments.
    ///
    /// Usage errors (unknown flags, wrong positional count) print clap's
    /// message and exit with the user-error code; help and version exit 0.
    pub fn parse_args() -> Self {
        match Self::try_parse() {
            Ok(cli) => cli,
            Err(e) => {
                let code = if e.use_stderr() { EXIT_USER_ERROR } else { 0 };
                let _ = e.print();
                std::process::exit(code);
            }
        }
    }

    /// Validates the raw arguments into a [`QueryConfig`].
    ///
    /// All validation happens here, before any network call: format and
    /// engine names, numeric limit and time bounds, and min <= max.
    pub fn into_config(self) -> Result<QueryConfig> {
        let format: OutputFormat = self.format.parse()?;
        let engine: Engine = self.engine.parse()?;

        let limit = self.limit.as_deref().map(parse_limit).transpose()?;
        let min_time = self.min.as_deref().map(parse_time_bound).transpose()?;
        let max_time = self.max.as_deref().map(parse_time_bound).transpose()?;

        if let (Some(min), Some(max)) = (min_time, max_time) {
            if min > max {
                return Err(TdqError::validation(format!(
                    "Minimum time ({min}) must not exceed maximum time ({max})"
                )));
            }
        }

        Ok(QueryConfig {
            format,
            columns: self.columns,
            limit,
            min_time,
            max_time,
            engine,
            database: self.database,
            table: self.table,
        })
    }
}

/// Parses a row limit: decimal digits only.
fn parse_limit(s: &str) -> Result<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TdqError::validation(format!(
            "Invalid limit: '{s}'. Enter only positive integers"
        )));
    }
    s.parse()
        .map_err(|_| TdqError::validation(format!("Limit out of range: '{s}'")))
}

/// Parses a time bound: optional leading minus, then decimal digits.
fn parse_time_bound(s: &str) -> Result<i64> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TdqError::validation(format!(
            "Invalid time bound: '{s}'. Enter only integers for min/max time"
        )));
    }
    s.parse()
        .map_err(|_| TdqError::validation(format!("Time bound out of range: '{s}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn config(args: &[&str]) -> Result<QueryConfig> {
        parse(args).into_config()
    }

    #[test]
    fn test_defaults() {
        let config = config(&["tdq", "mydb", "events"]).unwrap();
        assert_eq!(config.format, OutputFormat::Tabular);
        assert_eq!(config.columns, "*");
        assert_eq!(config.limit, None);
        assert_eq!(config.min_time, None);
        assert_eq!(config.max_time, None);
        assert_eq!(config.engine, Engine::Presto);
        assert_eq!(config.database, "mydb");
        assert_eq!(config.table, "events");
    }

    #[test]
    fn test_all_flags() {
        let config = config(&[
            "tdq", "-f", "csv", "-c", "id,name", "-l", "100", "-m", "100", "-M", "200", "-e",
            "hive", "mydb", "events",
        ])
        .unwrap();
        assert_eq!(config.format, OutputFormat::Csv);
        assert_eq!(config.columns, "id,name");
        assert_eq!(config.limit, Some(100));
        assert_eq!(config.min_time, Some(100));
        assert_eq!(config.max_time, Some(200));
        assert_eq!(config.engine, Engine::Hive);
    }

    #[test]
    fn test_long_flags() {
        let config = config(&[
            "tdq",
            "--format",
            "CSV",
            "--columns",
            "time",
            "--limit",
            "5",
            "--min",
            "-100",
            "--max",
            "0",
            "--engine",
            "HIVE",
            "mydb",
            "events",
        ])
        .unwrap();
        assert_eq!(config.format, OutputFormat::Csv);
        assert_eq!(config.min_time, Some(-100));
        assert_eq!(config.max_time, Some(0));
        assert_eq!(config.engine, Engine::Hive);
    }

    #[test]
    fn test_invalid_format_rejected() {
        let err = config(&["tdq", "-f", "xml", "mydb", "events"]).unwrap_err();
        assert!(matches!(err, TdqError::Validation(_)));
    }

    #[test]
    fn test_invalid_engine_rejected() {
        let err = config(&["tdq", "-e", "spark", "mydb", "events"]).unwrap_err();
        assert!(matches!(err, TdqError::Validation(_)));
    }

    #[test]
    fn test_non_numeric_limit_rejected() {
        let err = config(&["tdq", "-l", "abc", "mydb", "events"]).unwrap_err();
        assert!(matches!(err, TdqError::Validation(_)));
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_negative_limit_rejected() {
        // Sign characters are not digits, so "-5" is not a valid limit.
        let err = config(&["tdq", "-l=-5", "mydb", "events"]).unwrap_err();
        assert!(matches!(err, TdqError::Validation(_)));
    }

    #[test]
    fn test_non_numeric_time_rejected() {
        let err = config(&["tdq", "-m", "yesterday", "mydb", "events"]).unwrap_err();
        assert!(matches!(err, TdqError::Validation(_)));
    }

    #[test]
    fn test_min_greater_than_max_rejected() {
        let err = config(&["tdq", "-m", "200", "-M", "100", "mydb", "events"]).unwrap_err();
        assert!(matches!(err, TdqError::Validation(_)));
        assert!(err.to_string().contains("must not exceed"));
    }

    #[test]
    fn test_min_equal_max_accepted() {
        let config = config(&["tdq", "-m", "100", "-M", "100", "mydb", "events"]).unwrap();
        assert_eq!(config.min_time, Some(100));
        assert_eq!(config.max_time, Some(100));
    }

    #[test]
    fn test_negative_time_bounds_accepted() {
        let config = config(&["tdq", "-m", "-200", "-M", "-100", "mydb", "events"]).unwrap();
        assert_eq!(config.min_time, Some(-200));
        assert_eq!(config.max_time, Some(-100));
    }

    #[test]
    fn test_zero_positional_args_rejected() {
        assert!(Cli::try_parse_from(["tdq"]).is_err());
    }

    #[test]
    fn test_one_positional_arg_rejected() {
        assert!(Cli::try_parse_from(["tdq", "mydb"]).is_err());
    }

    #[test]
    fn test_three_positional_args_rejected() {
        assert!(Cli::try_parse_from(["tdq", "mydb", "events", "extra"]).is_err());
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(Cli::try_parse_from(["tdq", "--frobnicate", "mydb", "events"]).is_err());
    }
}
