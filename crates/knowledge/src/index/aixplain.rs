//! Hosted indexes on the aiXplain platform.
//!
//! Indexes are created through the platform API and then run like models:
//! ingest and search are actions posted to the model execution endpoint.
//! Execution may be asynchronous, in which case the returned poll URL is
//! queried until the action completes.

use super::{search_envelope, IndexService};
use crate::types::{Chunk, IndexInfo};
use aixp_core::{AppError, AppResult};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

const INDEXES_PATH: &str = "/sdk/indexes";

const POLL_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct AixplainIndex {
    backend_url: String,
    models_url: String,
    api_key: String,
    client: reqwest::Client,
    action_timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ExecuteRequest<'a> {
    action: &'a str,
    data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<Value>,
}

impl AixplainIndex {
    pub fn new(
        backend_url: &str,
        models_url: &str,
        api_key: &str,
        request_timeout: Duration,
        action_timeout: Duration,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| AppError::Index(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            backend_url: backend_url.trim_end_matches('/').to_string(),
            models_url: models_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
            action_timeout,
        })
    }

    fn execute_url(&self, index_id: &str) -> String {
        format!("{}/{}", self.models_url, index_id)
    }

    /// Run an index action, following the poll URL when execution is async.
    async fn execute(&self, index_id: &str, request: ExecuteRequest<'_>) -> AppResult<Value> {
        let action = request.action;
        let response = self
            .client
            .post(self.execute_url(index_id))
            .header("x-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Index(format!("Failed to send {} request: {}", action, e)))?;

        let body = read_json(response, action).await?;
        match pending_poll_url(&body) {
            Some(url) => self.poll(&url, action).await,
            None => check_failed(body, action),
        }
    }

    async fn poll(&self, url: &str, action: &str) -> AppResult<Value> {
        let deadline = Instant::now() + self.action_timeout;

        loop {
            tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;

            let response = self
                .client
                .get(url)
                .header("x-api-key", &self.api_key)
                .send()
                .await
                .map_err(|e| AppError::Index(format!("Failed to poll {}: {}", action, e)))?;

            let body = read_json(response, action).await?;
            if body.get("completed").and_then(Value::as_bool).unwrap_or(false) {
                return check_failed(body, action);
            }

            if Instant::now() >= deadline {
                return Err(AppError::Index(format!(
                    "Index {} did not complete within {}s",
                    action,
                    self.action_timeout.as_secs()
                )));
            }
        }
    }
}

/// A response still running carries `completed: false` and its poll URL in `data`.
fn pending_poll_url(body: &Value) -> Option<String> {
    let completed = body.get("completed").and_then(Value::as_bool).unwrap_or(true);
    if completed {
        return None;
    }
    body.get("data")
        .or_else(|| body.get("url"))
        .and_then(Value::as_str)
        .filter(|url| url.starts_with("http"))
        .map(str::to_string)
}

fn check_failed(body: Value, action: &str) -> AppResult<Value> {
    let status = body.get("status").and_then(Value::as_str).unwrap_or("");
    if status.eq_ignore_ascii_case("FAILED") {
        let reason = body
            .get("error")
            .or_else(|| body.get("supplierError"))
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(AppError::Index(format!("Index {} failed: {}", action, reason)));
    }
    Ok(body)
}

/// Hits are reported under `results`, `details` or `data`, depending on the
/// index type; a bare array is taken as the hits themselves.
fn extract_results(body: Value) -> Value {
    match body {
        Value::Object(mut obj) => {
            let key = ["results", "details", "data"]
                .into_iter()
                .find(|key| obj.get(*key).is_some_and(Value::is_array));
            match key.and_then(|key| obj.remove(key)) {
                Some(hits) => hits,
                None => Value::Object(obj),
            }
        }
        other => other,
    }
}

/// Ingested count from `count` (top level or under `data`); falls back to
/// the number of chunks sent when the backend reports none.
fn extract_count(body: &Value, sent: usize) -> usize {
    body.get("count")
        .or_else(|| body.get("data").and_then(|d| d.get("count")))
        .and_then(|c| {
            c.as_u64()
                .or_else(|| c.as_str().and_then(|s| s.trim().parse().ok()))
        })
        .map(|c| c as usize)
        .unwrap_or(sent)
}

async fn read_json(response: reqwest::Response, action: &str) -> AppResult<Value> {
    if !response.status().is_success() {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(AppError::Index(format!(
            "aiXplain API error during {} ({}): {}",
            action, status, error_text
        )));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::Index(format!("Failed to parse {} response: {}", action, e)))
}

#[async_trait]
impl IndexService for AixplainIndex {
    fn backend(&self) -> &str {
        "aixplain"
    }

    async fn create(&self, name: &str, description: &str) -> AppResult<IndexInfo> {
        tracing::info!("Creating aiXplain index '{}'", name);

        let response = self
            .client
            .post(format!("{}{}", self.backend_url, INDEXES_PATH))
            .header("x-api-key", &self.api_key)
            .json(&json!({"name": name, "description": description}))
            .send()
            .await
            .map_err(|e| AppError::Index(format!("Failed to send create request: {}", e)))?;

        let body = read_json(response, "create index").await?;
        let id = body
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::Index("Create index response has no id".to_string()))?;

        Ok(IndexInfo {
            id: id.to_string(),
            name: body
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or(name)
                .to_string(),
            description: body
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or(description)
                .to_string(),
        })
    }

    async fn ingest(&self, index_id: &str, chunks: &[Chunk]) -> AppResult<usize> {
        tracing::debug!("Ingesting {} chunks into {}", chunks.len(), index_id);

        let body = self
            .execute(
                index_id,
                ExecuteRequest {
                    action: "ingest",
                    data: serde_json::to_value(chunks)?,
                    payload: None,
                },
            )
            .await?;

        Ok(extract_count(&body, chunks.len()))
    }

    async fn search(&self, index_id: &str, query: &str, top_k: usize) -> AppResult<Value> {
        tracing::debug!("Searching {} (top_k: {})", index_id, top_k);

        let body = self
            .execute(
                index_id,
                ExecuteRequest {
                    action: "search",
                    data: Value::String(query.to_string()),
                    payload: Some(json!({"top_k": top_k})),
                },
            )
            .await?;

        Ok(search_envelope(index_id, query, extract_results(body), top_k))
    }
}
