//! Job client abstraction for the query service.
//!
//! Provides a trait-based interface over the remote service so the
//! orchestrator can be tested against scripted in-memory clients. The
//! service tracks each query as an asynchronous job: submit returns a
//! handle, the job is polled until it reaches a terminal status, and the
//! result is fetched as a byte stream afterward.

mod backoff;
mod http;
mod mock;

pub use backoff::ExponentialBackOff;
pub use http::HttpJobClient;
pub use mock::{FailingJobClient, MockJobClient};

use crate::config::{ApiConfig, Engine, OutputFormat};
use crate::error::Result;
use async_trait::async_trait;
use std::fmt;

/// Opaque identifier for a submitted job.
///
/// Owned by the orchestrator for the duration of one run; never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle(String);

impl JobHandle {
    /// Wraps a raw job id returned by the service.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw job id.
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status of a submitted job as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// Accepted but not yet running (includes the service's booting phase).
    Queued,
    Running,
    Success,
    /// The query executed and failed.
    Error,
    /// The job was killed before completion.
    Killed,
}

impl JobStatus {
    /// Parses a status string from the API.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "queued" | "booting" => Some(Self::Queued),
            "running" => Some(Self::Running),
            "success" => Some(Self::Success),
            "error" => Some(Self::Error),
            "killed" => Some(Self::Killed),
            _ => None,
        }
    }

    /// Returns true if the job has reached a terminal status.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Success | Self::Error | Self::Killed)
    }

    /// Returns true if the job finished successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Success => "success",
            Self::Error => "error",
            Self::Killed => "killed",
        };
        f.write_str(s)
    }
}

/// Transport format for fetched job results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultFormat {
    Csv,
    Tsv,
}

impl ResultFormat {
    /// Returns the format name as used in the result API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
        }
    }
}

impl From<OutputFormat> for ResultFormat {
    /// Tabular output is fetched as TSV; CSV output as CSV.
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Tabular => Self::Tsv,
            OutputFormat::Csv => Self::Csv,
        }
    }
}

/// Creates a job client for the given API configuration.
///
/// This is the central factory function for service connections.
pub async fn connect(config: &ApiConfig) -> Result<Box<dyn JobClient>> {
    let client = HttpJobClient::connect(config).await?;
    Ok(Box::new(client))
}

/// Trait defining the interface to the remote query service.
///
/// All operations are async and return Results with TdqError. The
/// orchestrator treats this purely as a boundary; nothing behind it is
/// re-implemented here.
#[async_trait]
pub trait JobClient: Send + Sync {
    /// Returns true if the named database exists.
    async fn database_exists(&self, database: &str) -> Result<bool>;

    /// Returns true if the table exists in the database.
    async fn table_exists(&self, database: &str, table: &str) -> Result<bool>;

    /// Lists the column names of a table, in schema order.
    async fn list_columns(&self, database: &str, table: &str) -> Result<Vec<String>>;

    /// Submits a query to the given engine and returns its job handle.
    async fn submit(&self, engine: Engine, database: &str, query: &str) -> Result<JobHandle>;

    /// Polls the current status of a job.
    async fn job_status(&self, handle: &JobHandle) -> Result<JobStatus>;

    /// Fetches the engine's diagnostic output for a failed job.
    async fn job_error_output(&self, handle: &JobHandle) -> Result<String>;

    /// Fetches the full result of a successful job.
    async fn fetch_result(&self, handle: &JobHandle, format: ResultFormat) -> Result<Vec<u8>>;

    /// Releases the connection. Must be called exactly once per run.
    async fn close(&self) -> Result<()>;
}
