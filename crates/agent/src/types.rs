//! Agent definition types sent to the platform.

use serde::{Deserialize, Serialize};

/// Specification of an agent to create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    pub name: String,

    pub description: String,

    /// LLM backing the agent; the platform default is used when absent
    #[serde(rename = "llmId", skip_serializing_if = "Option::is_none")]
    pub llm_id: Option<String>,

    #[serde(rename = "assets", default)]
    pub tools: Vec<ToolSpec>,
}

impl AgentSpec {
    /// Create a spec with no LLM override and no tools.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            llm_id: None,
            tools: Vec::new(),
        }
    }

    pub fn with_llm(mut self, llm_id: impl Into<String>) -> Self {
        self.llm_id = Some(llm_id.into());
        self
    }

    pub fn with_tool(mut self, tool: ToolSpec) -> Self {
        self.tools.push(tool);
        self
    }
}

/// A model tool attached to an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSpec {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(rename = "assetId", skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
}

impl ToolSpec {
    /// Tool backed by a specific model id.
    pub fn model(asset_id: impl Into<String>) -> Self {
        Self {
            kind: "model".to_string(),
            asset_id: Some(asset_id.into()),
            function: None,
            supplier: None,
        }
    }

    /// Tool selected by function, optionally pinned to a supplier.
    pub fn function(function: impl Into<String>, supplier: Option<String>) -> Self {
        Self {
            kind: "model".to_string(),
            asset_id: None,
            function: Some(function.into()),
            supplier,
        }
    }
}
