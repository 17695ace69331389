//! Agent runtime abstraction and response types.
//!
//! The agent platform returns loosely shaped JSON. `AgentResponse` keeps the
//! raw payload and exposes typed accessors whose failure path is explicit.

use aixp_core::AppResult;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a response did not carry a usable `data.output` string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseShapeError {
    #[error("response is not an object")]
    NotAnObject,

    #[error("response has no `data` object")]
    MissingData,

    #[error("response has no `data.output` field")]
    MissingOutput,

    #[error("`data.output` is not a string")]
    OutputNotString,
}

/// Raw response from one agent run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentResponse(pub serde_json::Value);

impl AgentResponse {
    /// Extract `data.output`.
    pub fn output(&self) -> Result<&str, ResponseShapeError> {
        let root = self.0.as_object().ok_or(ResponseShapeError::NotAnObject)?;
        let data = root
            .get("data")
            .and_then(|d| d.as_object())
            .ok_or(ResponseShapeError::MissingData)?;
        let output = data.get("output").ok_or(ResponseShapeError::MissingOutput)?;
        output.as_str().ok_or(ResponseShapeError::OutputNotString)
    }

    /// Session id the runtime assigned, if any.
    pub fn session_id(&self) -> Option<&str> {
        self.0
            .get("data")
            .and_then(|d| d.get("session_id"))
            .and_then(|s| s.as_str())
    }

    /// Answer text: `data.output`, or the response rendered as a string.
    ///
    /// Never fails. A JSON string payload is returned verbatim; any other
    /// shape is serialized.
    pub fn text(&self) -> String {
        match self.output() {
            Ok(output) => output.to_string(),
            Err(e) => {
                tracing::debug!("Agent response fallback to raw payload: {}", e);
                self.raw_text()
            }
        }
    }

    fn raw_text(&self) -> String {
        match &self.0 {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Value> for AgentResponse {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

impl From<String> for AgentResponse {
    fn from(value: String) -> Self {
        Self(serde_json::Value::String(value))
    }
}

/// Trait for agent runtimes.
///
/// Abstracts the hosted agent so that the RAG flow and the chat loop can be
/// driven by any implementation, including in-process fakes in tests.
#[async_trait::async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Identifier of the agent on its platform.
    fn agent_id(&self) -> &str;

    /// Run the agent on a prompt, optionally continuing a session.
    ///
    /// Transport, platform and timeout failures are returned as errors; the
    /// caller decides whether to retry or abort.
    async fn run(&self, prompt: &str, session_id: Option<&str>) -> AppResult<AgentResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_output_from_expected_shape() {
        let response = AgentResponse(json!({
            "completed": true,
            "data": {"output": "Hello!", "session_id": "s-1"}
        }));

        assert_eq!(response.output(), Ok("Hello!"));
        assert_eq!(response.session_id(), Some("s-1"));
        assert_eq!(response.text(), "Hello!");
    }

    #[test]
    fn test_plain_string_response_falls_back_verbatim() {
        let response = AgentResponse::from("just text".to_string());

        assert_eq!(response.output(), Err(ResponseShapeError::NotAnObject));
        assert_eq!(response.text(), "just text");
        assert_eq!(response.session_id(), None);
    }

    #[test]
    fn test_missing_output_falls_back_to_json() {
        let response = AgentResponse(json!({"data": {"status": "FAILED"}}));

        assert_eq!(response.output(), Err(ResponseShapeError::MissingOutput));
        assert_eq!(response.text(), r#"{"data":{"status":"FAILED"}}"#);
    }

    #[test]
    fn test_non_string_output() {
        let response = AgentResponse(json!({"data": {"output": 42}}));
        assert_eq!(response.output(), Err(ResponseShapeError::OutputNotString));
    }

    #[test]
    fn test_data_not_object() {
        let response = AgentResponse(json!({"data": "https://poll.example/1"}));
        assert_eq!(response.output(), Err(ResponseShapeError::MissingData));
    }
}
