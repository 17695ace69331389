//! Agent factory.
//!
//! Builds the agent runtime from application configuration: resolves the
//! optional model tool, then either attaches to a configured agent id or
//! creates a new agent on the platform.

use crate::client::AgentRuntime;
use crate::providers::AixplainClient;
use crate::types::{AgentSpec, ToolSpec};
use aixp_core::config::{AppConfig, ToolConfig};
use aixp_core::AppResult;
use std::sync::Arc;
use std::time::Duration;

/// Name of the agent created by the scaffold.
pub const AGENT_NAME: &str = "Starter Agent";

/// Description of the agent created by the scaffold.
pub const AGENT_DESCRIPTION: &str = "A minimal agent for aiXplain certification scaffold.";

/// Resolve the tool list from configuration.
///
/// A tool id wins over a function. An unusable function name drops the tool
/// with a warning rather than failing agent construction.
pub fn resolve_tools(tool: &ToolConfig) -> Vec<ToolSpec> {
    if let Some(ref id) = tool.id {
        return vec![ToolSpec::model(id.clone())];
    }

    let Some(ref function) = tool.function else {
        return Vec::new();
    };

    match function_id(function) {
        Some(function) => {
            let supplier = tool
                .supplier
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            vec![ToolSpec::function(function, supplier)]
        }
        None => {
            tracing::warn!("Ignoring tool with invalid function name '{}'", function);
            Vec::new()
        }
    }
}

/// Normalize a function name such as `TEXT_GENERATION` to `text-generation`.
fn function_id(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return None;
    }
    Some(trimmed.to_ascii_lowercase().replace('_', "-"))
}

/// Build the agent spec the scaffold creates.
pub fn agent_spec(config: &AppConfig) -> AgentSpec {
    let mut spec = AgentSpec::new(AGENT_NAME, AGENT_DESCRIPTION);
    if let Some(ref llm_id) = config.aixplain.llm_id {
        spec = spec.with_llm(llm_id.clone());
    }
    for tool in resolve_tools(&config.aixplain.tool) {
        spec = spec.with_tool(tool);
    }
    spec
}

/// Create the agent runtime.
///
/// # Errors
/// Returns a configuration error if `AIXPLAIN_API_KEY` is missing, or an
/// agent error if the platform rejects the create call.
pub async fn build_agent(config: &AppConfig) -> AppResult<Arc<dyn AgentRuntime>> {
    let api_key = config.require_api_key()?;
    let client = AixplainClient::new(
        &config.aixplain.backend_url,
        api_key,
        Duration::from_secs(config.http_timeout_secs),
    )?;
    let run_timeout = Duration::from_secs(config.aixplain.run_timeout_secs);

    if let Some(ref agent_id) = config.aixplain.agent_id {
        tracing::info!("Using existing agent {}", agent_id);
        return Ok(Arc::new(client.attach(agent_id.clone(), run_timeout)));
    }

    let agent = client.create_agent(&agent_spec(config), run_timeout).await?;
    Ok(Arc::new(agent))
}
