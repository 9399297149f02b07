//! Mock job clients for testing.
//!
//! `MockJobClient` replays a scripted status sequence without touching the
//! network; `FailingJobClient` fails every operation, for exercising error
//! paths. Both count their `close` invocations so tests can verify the
//! close-exactly-once discipline.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::client::{JobClient, JobHandle, JobStatus, ResultFormat};
use crate::config::Engine;
use crate::error::{Result, TdqError};

struct MockTable {
    database: String,
    name: String,
    columns: Vec<String>,
}

/// A scripted in-memory job client.
pub struct MockJobClient {
    databases: Vec<String>,
    tables: Vec<MockTable>,
    statuses: Mutex<VecDeque<JobStatus>>,
    result: Vec<u8>,
    error_output: String,
    engine_unavailable: bool,
    status_calls: AtomicUsize,
    submit_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    close_calls: AtomicUsize,
}

impl MockJobClient {
    /// Creates a mock with no databases and an immediately successful job.
    pub fn new() -> Self {
        Self {
            databases: Vec::new(),
            tables: Vec::new(),
            statuses: Mutex::new(VecDeque::from([JobStatus::Success])),
            result: Vec::new(),
            error_output: String::new(),
            engine_unavailable: false,
            status_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            close_calls: AtomicUsize::new(0),
        }
    }

    /// Registers a database.
    pub fn with_database(mut self, name: impl Into<String>) -> Self {
        self.databases.push(name.into());
        self
    }

    /// Registers a table with its columns; the database is registered too.
    pub fn with_table(
        mut self,
        database: impl Into<String>,
        name: impl Into<String>,
        columns: &[&str],
    ) -> Self {
        let database = database.into();
        if !self.databases.contains(&database) {
            self.databases.push(database.clone());
        }
        self.tables.push(MockTable {
            database,
            name: name.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        });
        self
    }

    /// Scripts the status sequence the job will report. The last status
    /// repeats once the script is exhausted.
    pub fn with_statuses(self, statuses: &[JobStatus]) -> Self {
        *self.statuses.lock().unwrap() = statuses.iter().copied().collect();
        self
    }

    /// Sets the bytes returned when the job result is fetched.
    pub fn with_result(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.result = bytes.into();
        self
    }

    /// Sets the diagnostic output reported for a failed job.
    pub fn with_error_output(mut self, output: impl Into<String>) -> Self {
        self.error_output = output.into();
        self
    }

    /// Makes every submit fail with an engine-unavailable error.
    pub fn with_engine_unavailable(mut self) -> Self {
        self.engine_unavailable = true;
        self
    }

    /// Number of status polls issued so far.
    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    /// Number of submissions issued so far.
    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    /// Number of result fetches issued so far.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Number of times `close` has been invoked.
    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockJobClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobClient for MockJobClient {
    async fn database_exists(&self, database: &str) -> Result<bool> {
        Ok(self.databases.iter().any(|db| db == database))
    }

    async fn table_exists(&self, database: &str, table: &str) -> Result<bool> {
        Ok(self
            .tables
            .iter()
            .any(|t| t.database == database && t.name == table))
    }

    async fn list_columns(&self, database: &str, table: &str) -> Result<Vec<String>> {
        self.tables
            .iter()
            .find(|t| t.database == database && t.name == table)
            .map(|t| t.columns.clone())
            .ok_or_else(|| {
                TdqError::not_found(format!(
                    "The table '{table}' does not exist in the database '{database}'"
                ))
            })
    }

    async fn submit(&self, engine: Engine, _database: &str, _query: &str) -> Result<JobHandle> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        if self.engine_unavailable {
            return Err(TdqError::engine_unavailable(format!(
                "The {engine} engine is not enabled for this account"
            )));
        }
        Ok(JobHandle::new("mock-job-1"))
    }

    async fn job_status(&self, _handle: &JobHandle) -> Result<JobStatus> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let mut statuses = self.statuses.lock().unwrap();
        match statuses.len() {
            0 => Err(TdqError::api("Mock status script is empty")),
            1 => Ok(statuses[0]),
            _ => Ok(statuses.pop_front().unwrap()),
        }
    }

    async fn job_error_output(&self, _handle: &JobHandle) -> Result<String> {
        Ok(self.error_output.clone())
    }

    async fn fetch_result(&self, _handle: &JobHandle, _format: ResultFormat) -> Result<Vec<u8>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.result.clone())
    }

    async fn close(&self) -> Result<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A job client whose every operation fails with a connection error.
pub struct FailingJobClient {
    close_calls: AtomicUsize,
}

impl FailingJobClient {
    pub fn new() -> Self {
        Self {
            close_calls: AtomicUsize::new(0),
        }
    }

    /// Number of times `close` has been invoked.
    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> Result<T> {
        Err(TdqError::connection("mock connection failure"))
    }
}

impl Default for FailingJobClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobClient for FailingJobClient {
    async fn database_exists(&self, _database: &str) -> Result<bool> {
        self.fail()
    }

    async fn table_exists(&self, _database: &str, _table: &str) -> Result<bool> {
        self.fail()
    }

    async fn list_columns(&self, _database: &str, _table: &str) -> Result<Vec<String>> {
        self.fail()
    }

    async fn submit(&self, _engine: Engine, _database: &str, _query: &str) -> Result<JobHandle> {
        self.fail()
    }

    async fn job_status(&self, _handle: &JobHandle) -> Result<JobStatus> {
        self.fail()
    }

    async fn job_error_output(&self, _handle: &JobHandle) -> Result<String> {
        self.fail()
    }

    async fn fetch_result(&self, _handle: &JobHandle, _format: ResultFormat) -> Result<Vec<u8>> {
        self.fail()
    }

    async fn close(&self) -> Result<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_existence_checks() {
        let client = MockJobClient::new().with_table("mydb", "events", &["id", "time"]);
        assert!(client.database_exists("mydb").await.unwrap());
        assert!(!client.database_exists("other").await.unwrap());
        assert!(client.table_exists("mydb", "events").await.unwrap());
        assert!(!client.table_exists("mydb", "users").await.unwrap());
    }

    #[tokio::test]
    async fn test_mock_status_script() {
        let client = MockJobClient::new().with_statuses(&[
            JobStatus::Queued,
            JobStatus::Running,
            JobStatus::Success,
        ]);
        let handle = JobHandle::new("mock-job-1");
        assert_eq!(client.job_status(&handle).await.unwrap(), JobStatus::Queued);
        assert_eq!(client.job_status(&handle).await.unwrap(), JobStatus::Running);
        assert_eq!(client.job_status(&handle).await.unwrap(), JobStatus::Success);
        // Terminal status repeats
        assert_eq!(client.job_status(&handle).await.unwrap(), JobStatus::Success);
        assert_eq!(client.status_calls(), 4);
    }

    #[tokio::test]
    async fn test_failing_client_counts_close() {
        let client = FailingJobClient::new();
        assert!(client.database_exists("mydb").await.is_err());
        client.close().await.unwrap();
        assert_eq!(client.close_calls(), 1);
    }
}
