//! Configuration for td-query.
//!
//! Holds the immutable query configuration built once from command-line
//! input, and the API connection settings read from the environment.

use crate::error::{Result, TdqError};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Default endpoint for the query service REST API.
pub const DEFAULT_ENDPOINT: &str = "https://api.treasuredata.com";

/// Output format for query results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Print the result to standard output.
    #[default]
    Tabular,
    /// Save the result as a CSV file in the working directory.
    Csv,
}

impl FromStr for OutputFormat {
    type Err = TdqError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "tabular" => Ok(Self::Tabular),
            "csv" => Ok(Self::Csv),
            _ => Err(TdqError::validation(format!(
                "Invalid format: '{s}'. Expected: tabular or csv"
            ))),
        }
    }
}

impl OutputFormat {
    /// Returns the format as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tabular => "tabular",
            Self::Csv => "csv",
        }
    }
}

/// SQL execution engine selected for a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Engine {
    Hive,
    #[default]
    Presto,
}

impl FromStr for Engine {
    type Err = TdqError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "hive" => Ok(Self::Hive),
            "presto" => Ok(Self::Presto),
            _ => Err(TdqError::validation(format!(
                "Invalid engine: '{s}'. Expected: hive or presto"
            ))),
        }
    }
}

impl Engine {
    /// Returns the engine name as used in API paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hive => "hive",
            Self::Presto => "presto",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated, immutable query configuration.
///
/// Built once by the argument parser and passed explicitly to the query
/// builder and the orchestrator; nothing mutates it after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    /// Output format for the result.
    pub format: OutputFormat,

    /// Column list to select, interpolated verbatim. Defaults to `*`.
    pub columns: String,

    /// Optional row limit.
    pub limit: Option<u64>,

    /// Optional lower time bound, epoch seconds.
    pub min_time: Option<i64>,

    /// Optional upper time bound, epoch seconds.
    pub max_time: Option<i64>,

    /// Execution engine to submit the query to.
    pub engine: Engine,

    /// Target database name.
    pub database: String,

    /// Target table name.
    pub table: String,
}

/// Connection settings for the query service API.
///
/// Authentication is entirely environment-based; there is no config file.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the REST API.
    pub endpoint: Url,

    /// API key sent with every request.
    pub api_key: String,
}

impl ApiConfig {
    /// Creates a config from an endpoint string and API key.
    pub fn new(endpoint: &str, api_key: impl Into<String>) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| TdqError::connection(format!("Invalid API endpoint '{endpoint}': {e}")))?;
        Ok(Self {
            endpoint,
            api_key: api_key.into(),
        })
    }

    /// Creates a config from environment variables.
    ///
    /// Reads `TD_API_KEY` for the API key. Optionally reads `TD_API_SERVER`
    /// for the endpoint (defaults to the public API server).
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("TD_API_KEY")
            .map_err(|_| TdqError::connection("TD_API_KEY environment variable not set"))?;

        let endpoint =
            std::env::var("TD_API_SERVER").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());

        Self::new(&endpoint, api_key)
    }
}
