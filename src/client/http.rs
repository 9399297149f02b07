//! HTTP implementation of the job client.
//!
//! Talks to the query service's REST API with apikey authentication.
//! Endpoints used: `/v3/system/server_status`, `/v3/database/list`,
//! `/v3/table/list/{db}`, `/v3/job/issue/{engine}/{db}`,
//! `/v3/job/status/{id}`, `/v3/job/show/{id}`, `/v3/job/result/{id}`.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::client::{JobClient, JobHandle, JobStatus, ResultFormat};
use crate::config::{ApiConfig, Engine};
use crate::error::{Result, TdqError};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP job client for the query service.
#[derive(Debug, Clone)]
pub struct HttpJobClient {
    config: ApiConfig,
    client: Client,
}

impl HttpJobClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| TdqError::connection(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Creates a client and verifies the service is reachable.
    pub async fn connect(config: &ApiConfig) -> Result<Self> {
        let client = Self::new(config.clone())?;
        let response = client.get("v3/system/server_status").await?;
        if !response.status().is_success() {
            return Err(TdqError::connection(format!(
                "Service returned {} during connection check",
                response.status()
            )));
        }
        debug!(endpoint = %client.config.endpoint, "connected to query service");
        Ok(client)
    }

    /// Resolves an API path against the configured endpoint.
    fn url(&self, path: &str) -> Result<url::Url> {
        self.config
            .endpoint
            .join(path)
            .map_err(|e| TdqError::api(format!("Invalid API path '{path}': {e}")))
    }

    /// Issues an authenticated GET request.
    async fn get(&self, path: &str) -> Result<Response> {
        let url = self.url(path)?;
        self.client
            .get(url)
            .header("Authorization", format!("TD1 {}", self.config.api_key))
            .send()
            .await
            .map_err(map_transport_error)
    }

    /// Issues an authenticated GET request and deserializes the JSON body.
    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T> {
        let response = self.get(path).await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TdqError::api(format!("Failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(parse_error(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| TdqError::api(format!("Unexpected response from {path}: {e}")))
    }
}

/// Maps a reqwest transport failure to the error taxonomy.
fn map_transport_error(e: reqwest::Error) -> TdqError {
    if e.is_timeout() {
        TdqError::connection("Request to the query service timed out")
    } else if e.is_connect() {
        TdqError::connection(format!("Failed to reach the query service: {e}"))
    } else {
        TdqError::api(format!("Request failed: {e}"))
    }
}

/// Maps a non-success API response to the error taxonomy.
fn parse_error(status: StatusCode, body: &str) -> TdqError {
    if status == StatusCode::UNAUTHORIZED {
        return TdqError::connection("Authentication failed. Check your TD_API_KEY.");
    }

    // Try to extract the service's own message from the body
    let message = serde_json::from_str::<ApiErrorResponse>(body)
        .ok()
        .and_then(|e| e.message())
        .unwrap_or_else(|| body.to_string());

    TdqError::api(format!("Service error ({status}): {message}"))
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: Option<String>,
    message: Option<String>,
}

impl ApiErrorResponse {
    fn message(self) -> Option<String> {
        self.error.or(self.message)
    }
}

#[derive(Deserialize)]
struct DatabaseList {
    databases: Vec<DatabaseEntry>,
}

#[derive(Deserialize)]
struct DatabaseEntry {
    name: String,
}

#[derive(Deserialize)]
struct TableList {
    tables: Vec<TableEntry>,
}

#[derive(Deserialize)]
struct TableEntry {
    name: String,
    /// JSON-encoded array of `[name, type]` pairs.
    schema: Option<String>,
}

impl TableEntry {
    /// Extracts the column names from the embedded schema string.
    fn column_names(&self) -> Vec<String> {
        let Some(schema) = &self.schema else {
            return Vec::new();
        };
        let Ok(entries) = serde_json::from_str::<Vec<Vec<serde_json::Value>>>(schema) else {
            return Vec::new();
        };
        entries
            .iter()
            .filter_map(|entry| entry.first().and_then(|v| v.as_str()).map(String::from))
            .collect()
    }
}

#[derive(Deserialize)]
struct JobIssueResponse {
    /// The API has returned both string and numeric job ids over time.
    job_id: serde_json::Value,
}

#[derive(Deserialize)]
struct JobStatusResponse {
    status: String,
}

#[derive(Deserialize)]
struct JobShowResponse {
    debug: Option<JobDebugOutput>,
}

#[derive(Deserialize)]
struct JobDebugOutput {
    stderr: Option<String>,
    cmdout: Option<String>,
}

#[async_trait]
impl JobClient for HttpJobClient {
    async fn database_exists(&self, database: &str) -> Result<bool> {
        let list: DatabaseList = self.get_json("v3/database/list").await?;
        Ok(list.databases.iter().any(|db| db.name == database))
    }

    async fn table_exists(&self, database: &str, table: &str) -> Result<bool> {
        let list: TableList = self.get_json(&format!("v3/table/list/{database}")).await?;
        Ok(list.tables.iter().any(|t| t.name == table))
    }

    async fn list_columns(&self, database: &str, table: &str) -> Result<Vec<String>> {
        let list: TableList = self.get_json(&format!("v3/table/list/{database}")).await?;
        list.tables
            .iter()
            .find(|t| t.name == table)
            .map(TableEntry::column_names)
            .ok_or_else(|| {
                TdqError::not_found(format!(
                    "The table '{table}' does not exist in the database '{database}'"
                ))
            })
    }

    async fn submit(&self, engine: Engine, database: &str, query: &str) -> Result<JobHandle> {
        let url = self.url(&format!("v3/job/issue/{}/{database}", engine.as_str()))?;
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("TD1 {}", self.config.api_key))
            .form(&[("query", query)])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TdqError::api(format!("Failed to read response body: {e}")))?;

        if status == StatusCode::FORBIDDEN {
            return Err(TdqError::engine_unavailable(format!(
                "The {engine} engine is not enabled for this account"
            )));
        }
        if !status.is_success() {
            return Err(parse_error(status, &body));
        }

        let issued: JobIssueResponse = serde_json::from_str(&body)
            .map_err(|e| TdqError::api(format!("Unexpected submit response: {e}")))?;

        let job_id = match issued.job_id {
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => n.to_string(),
            other => {
                return Err(TdqError::api(format!(
                    "Unexpected job id in submit response: {other}"
                )))
            }
        };

        debug!(job_id = %job_id, %engine, "job submitted");
        Ok(JobHandle::new(job_id))
    }

    async fn job_status(&self, handle: &JobHandle) -> Result<JobStatus> {
        let response: JobStatusResponse = self
            .get_json(&format!("v3/job/status/{}", handle.id()))
            .await?;
        JobStatus::parse(&response.status).ok_or_else(|| {
            TdqError::api(format!(
                "Unknown job status '{}' for job {handle}",
                response.status
            ))
        })
    }

    async fn job_error_output(&self, handle: &JobHandle) -> Result<String> {
        let response: JobShowResponse = self
            .get_json(&format!("v3/job/show/{}", handle.id()))
            .await?;
        Ok(response
            .debug
            .and_then(|d| d.stderr.or(d.cmdout))
            .unwrap_or_default())
    }

    async fn fetch_result(&self, handle: &JobHandle, format: ResultFormat) -> Result<Vec<u8>> {
        let response = self
            .get(&format!(
                "v3/job/result/{}?format={}",
                handle.id(),
                format.as_str()
            ))
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(parse_error(status, &body));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TdqError::api(format!("Failed to read job result: {e}")))?;
        Ok(bytes.to_vec())
    }

    async fn close(&self) -> Result<()> {
        // The HTTP client holds no server-side session; dropping it is
        // enough. The explicit close keeps the release point observable.
        Ok(())
    }
}
