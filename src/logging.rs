//! Logging configuration for td-query.
//!
//! Logs go to stderr so the query result stream on stdout stays clean
//! enough to pipe or redirect.

use tracing_subscriber::EnvFilter;

/// Initializes stderr logging with an env-filter (default `info`).
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
