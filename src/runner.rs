//! Run orchestration.
//!
//! Sequences one query run end to end: validate the target database and
//! table, build the SQL, submit it, poll the job with exponential backoff
//! until it reaches a terminal status, then fetch and write the result.
//! The client is closed exactly once on every exit path.

use std::path::Path;

use tracing::{debug, info};

use crate::client::{ExponentialBackOff, JobClient, JobHandle, JobStatus};
use crate::config::QueryConfig;
use crate::error::{Result, TdqError};
use crate::output::{self, WriteOutcome};
use crate::query::build_query;

/// Runs one query against the service and writes the result.
///
/// Wraps [`execute`] so that `close` is invoked exactly once whether the
/// run succeeds or fails. A close failure after a successful run is still
/// reported; a close failure after a failed run is dropped in favor of
/// the original error.
pub async fn run(
    client: &dyn JobClient,
    config: &QueryConfig,
    out_dir: &Path,
) -> Result<WriteOutcome> {
    let outcome = execute(client, config, out_dir).await;
    let closed = client.close().await;
    let outcome = outcome?;
    closed?;
    Ok(outcome)
}

/// The linear run flow, without connection cleanup.
async fn execute(
    client: &dyn JobClient,
    config: &QueryConfig,
    out_dir: &Path,
) -> Result<WriteOutcome> {
    validate_target(client, config).await?;

    let sql = build_query(config);
    info!(engine = %config.engine, "going to run the query: {sql}");

    let handle = client
        .submit(config.engine, &config.database, &sql)
        .await?;
    info!(job = %handle, "job submitted");

    let status = poll_until_finished(client, &handle, &mut ExponentialBackOff::new()).await?;

    if !status.is_success() {
        let stderr = client.job_error_output(&handle).await?;
        return Err(TdqError::job_failed(stderr));
    }

    let bytes = client.fetch_result(&handle, config.format.into()).await?;
    debug!(bytes = bytes.len(), "fetched job result");

    output::write_result(config.format, &bytes, out_dir)
}

/// Verifies the database, the table, and any explicitly requested columns
/// exist before anything is submitted.
async fn validate_target(client: &dyn JobClient, config: &QueryConfig) -> Result<()> {
    if !client.database_exists(&config.database).await? {
        return Err(TdqError::not_found(format!(
            "The database '{}' does not exist",
            config.database
        )));
    }

    if !client.table_exists(&config.database, &config.table).await? {
        return Err(TdqError::not_found(format!(
            "The table '{}' does not exist in the database '{}'",
            config.table, config.database
        )));
    }

    // A wildcard selects whatever is there; only named columns are checked.
    if config.columns.trim() == "*" {
        return Ok(());
    }

    let known = client
        .list_columns(&config.database, &config.table)
        .await?;
    for column in config.columns.split(',').map(str::trim) {
        if !column.is_empty() && !known.iter().any(|c| c == column) {
            return Err(TdqError::not_found(format!(
                "The column '{}' does not exist in the table '{}'",
                column, config.table
            )));
        }
    }

    Ok(())
}

/// Polls the job until it reaches a terminal status.
///
/// Sleeps for the interval the backoff reports between consecutive polls;
/// there is no timeout and no cancellation. Returns the terminal status.
pub async fn poll_until_finished(
    client: &dyn JobClient,
    handle: &JobHandle,
    backoff: &mut ExponentialBackOff,
) -> Result<JobStatus> {
    let mut status = client.job_status(handle).await?;
    while !status.is_finished() {
        info!(job = %handle, %status, "query is executing");
        tokio::time::sleep(backoff.next_wait()).await;
        status = client.job_status(handle).await?;
    }
    debug!(job = %handle, %status, "job finished");
    Ok(status)
}
