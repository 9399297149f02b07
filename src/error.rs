//! Error types for td-query.
//!
//! Defines the main error enum used throughout the application and its
//! mapping to process exit codes.

use thiserror::Error;

/// Exit code for user errors (bad flag value, wrong argument count).
pub const EXIT_USER_ERROR: i32 = 1;

/// Exit code for service errors (connection, missing resources, failed jobs).
pub const EXIT_SERVICE_ERROR: i32 = 2;

/// Main error type for td-query operations.
#[derive(Error, Debug)]
pub enum TdqError {
    /// Invalid command-line input (bad flag value, min > max, etc.)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Cannot reach or authenticate with the query service.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The requested database, table, or column does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The selected engine is not enabled for this account.
    #[error("Engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The job reached a terminal failure state; carries the engine's
    /// own diagnostic output verbatim.
    #[error("Query job failed:\n{0}")]
    JobFailed(String),

    /// Unexpected API response or transport failure.
    #[error("API error: {0}")]
    Api(String),

    /// Local I/O failure (writing the CSV file, resolving paths).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TdqError {
    /// Creates a validation error with the given message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a not-found error with the given message.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Creates an engine-unavailable error with the given message.
    pub fn engine_unavailable(msg: impl Into<String>) -> Self {
        Self::EngineUnavailable(msg.into())
    }

    /// Creates a job-failure error carrying the engine's diagnostic output.
    pub fn job_failed(stderr: impl Into<String>) -> Self {
        Self::JobFailed(stderr.into())
    }

    /// Creates an API error with the given message.
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Validation Error",
            Self::Connection(_) => "Connection Error",
            Self::NotFound(_) => "Not Found",
            Self::EngineUnavailable(_) => "Engine Unavailable",
            Self::JobFailed(_) => "Job Failed",
            Self::Api(_) => "API Error",
            Self::Io(_) => "I/O Error",
        }
    }

    /// Returns the process exit code for this error.
    ///
    /// Validation errors are user errors; everything else is a service
    /// error. The single mapping replaces the assorted codes the tool
    /// historically used for each failure site.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => EXIT_USER_ERROR,
            _ => EXIT_SERVICE_ERROR,
        }
    }
}

/// Result type alias using TdqError.
pub type Result<T> = std::result::Result<T, TdqError>;
