//! aiXplain agent runtime.
//!
//! Agents are created through the platform API. A run is asynchronous on the
//! platform side: the run call returns a poll URL which is queried until the
//! run completes or the run timeout expires.

use crate::client::{AgentResponse, AgentRuntime};
use crate::types::AgentSpec;
use aixp_core::{AppError, AppResult};
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};

const AGENTS_PATH: &str = "/sdk/agents";

/// Delay between poll requests
const POLL_INTERVAL_MS: u64 = 1000;

/// HTTP client for the aiXplain platform API.
#[derive(Debug, Clone)]
pub struct AixplainClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    query: &'a str,
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
}

impl AixplainClient {
    /// Create a client with a per-request timeout.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        request_timeout: Duration,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| AppError::Agent(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    fn agents_url(&self) -> String {
        format!("{}{}", self.base_url, AGENTS_PATH)
    }

    /// Create an agent and return a runtime bound to it.
    pub async fn create_agent(
        &self,
        spec: &AgentSpec,
        run_timeout: Duration,
    ) -> AppResult<AixplainAgent> {
        tracing::info!("Creating agent '{}' with {} tool(s)", spec.name, spec.tools.len());

        let response = self
            .client
            .post(self.agents_url())
            .header("x-api-key", &self.api_key)
            .json(spec)
            .send()
            .await
            .map_err(|e| AppError::Agent(format!("Failed to send create request: {}", e)))?;

        let body = read_json(response, "create agent").await?;
        let id = body
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AppError::Agent("Create agent response has no id".to_string()))?;

        tracing::info!("Created agent {}", id);
        Ok(self.attach(id, run_timeout))
    }

    /// Bind a runtime to an existing agent id.
    pub fn attach(&self, agent_id: impl Into<String>, run_timeout: Duration) -> AixplainAgent {
        AixplainAgent {
            client: self.clone(),
            id: agent_id.into(),
            run_timeout,
            poll_interval: Duration::from_millis(POLL_INTERVAL_MS),
        }
    }
}

/// An agent hosted on the aiXplain platform.
#[derive(Debug, Clone)]
pub struct AixplainAgent {
    client: AixplainClient,
    id: String,
    run_timeout: Duration,
    poll_interval: Duration,
}

impl AixplainAgent {
    fn run_url(&self) -> String {
        format!("{}/{}/run", self.client.agents_url(), self.id)
    }

    async fn start_run(&self, prompt: &str, session_id: Option<&str>) -> AppResult<String> {
        let response = self
            .client
            .client
            .post(self.run_url())
            .header("x-api-key", &self.client.api_key)
            .json(&RunRequest {
                query: prompt,
                session_id,
            })
            .send()
            .await
            .map_err(|e| AppError::Agent(format!("Failed to send run request: {}", e)))?;

        let body = read_json(response, "run agent").await?;
        poll_url(&body)
    }

    async fn poll(&self, url: &str) -> AppResult<AgentResponse> {
        let deadline = Instant::now() + self.run_timeout;

        loop {
            let response = self
                .client
                .client
                .get(url)
                .header("x-api-key", &self.client.api_key)
                .send()
                .await
                .map_err(|e| AppError::Agent(format!("Failed to poll agent run: {}", e)))?;

            let body = read_json(response, "poll agent run").await?;

            match run_state(&body) {
                RunState::Completed => return Ok(AgentResponse(body)),
                RunState::Failed(reason) => {
                    return Err(AppError::Agent(format!("Agent run failed: {}", reason)))
                }
                RunState::Pending => {}
            }

            if Instant::now() >= deadline {
                return Err(AppError::Agent(format!(
                    "Agent run did not complete within {}s",
                    self.run_timeout.as_secs()
                )));
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait::async_trait]
impl AgentRuntime for AixplainAgent {
    fn agent_id(&self) -> &str {
        &self.id
    }

    async fn run(&self, prompt: &str, session_id: Option<&str>) -> AppResult<AgentResponse> {
        tracing::info!("Running agent {}", self.id);
        tracing::debug!("Prompt ({} chars), session: {:?}", prompt.chars().count(), session_id);

        let url = self.start_run(prompt, session_id).await?;
        let response = self.poll(&url).await?;

        tracing::info!("Agent {} run completed", self.id);
        Ok(response)
    }
}

#[derive(Debug, PartialEq)]
enum RunState {
    Pending,
    Completed,
    Failed(String),
}

fn run_state(body: &Value) -> RunState {
    let status = body.get("status").and_then(|s| s.as_str()).unwrap_or("");
    if status.eq_ignore_ascii_case("FAILED") {
        let reason = body
            .get("error")
            .or_else(|| body.get("supplierError"))
            .and_then(|e| e.as_str())
            .unwrap_or("unknown error");
        return RunState::Failed(reason.to_string());
    }

    if body.get("completed").and_then(|c| c.as_bool()).unwrap_or(false) {
        RunState::Completed
    } else {
        RunState::Pending
    }
}

/// The run endpoint answers with `{"data": "<poll url>"}` (or `url`).
fn poll_url(body: &Value) -> AppResult<String> {
    body.get("data")
        .or_else(|| body.get("url"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| AppError::Agent(format!("Run response has no poll URL: {}", body)))
}

async fn read_json(response: reqwest::Response, action: &str) -> AppResult<Value> {
    if !response.status().is_success() {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(AppError::Agent(format!(
            "aiXplain API error during {} ({}): {}",
            action, status, error_text
        )));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::Agent(format!("Failed to parse {} response: {}", action, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> AixplainClient {
        AixplainClient::new("https://platform.example/", "key", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_urls() {
        let agent = client().attach("agent-1", Duration::from_secs(60));
        assert_eq!(agent.agent_id(), "agent-1");
        assert_eq!(agent.run_url(), "https://platform.example/sdk/agents/agent-1/run");
    }

    #[test]
    fn test_run_request_serialization() {
        let without = serde_json::to_value(RunRequest {
            query: "hi",
            session_id: None,
        })
        .unwrap();
        assert_eq!(without, json!({"query": "hi"}));

        let with = serde_json::to_value(RunRequest {
            query: "hi",
            session_id: Some("s-1"),
        })
        .unwrap();
        assert_eq!(with["sessionId"], "s-1");
    }

    #[test]
    fn test_poll_url_extraction() {
        assert_eq!(
            poll_url(&json!({"requestId": "r", "data": "https://poll/1"})).unwrap(),
            "https://poll/1"
        );
        assert!(poll_url(&json!({"requestId": "r"})).is_err());
    }

    #[test]
    fn test_run_state() {
        assert_eq!(run_state(&json!({"completed": false})), RunState::Pending);
        assert_eq!(
            run_state(&json!({"completed": true, "data": {"output": "x"}})),
            RunState::Completed
        );
        assert_eq!(
            run_state(&json!({"completed": true, "status": "FAILED", "error": "quota"})),
            RunState::Failed("quota".to_string())
        );
    }
}
