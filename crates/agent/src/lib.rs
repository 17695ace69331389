//! Agent runtime integration for the aixp CLI.
//!
//! This crate wraps the hosted agent platform behind the `AgentRuntime`
//! trait so that the RAG answerer and the chat loop never depend on a
//! concrete client.
//!
//! # Example
//! ```no_run
//! use aixp_agent::{build_agent, AgentRuntime};
//! use aixp_core::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let agent = build_agent(&config).await?;
//! let response = agent.run("Say hello and confirm you're alive.", None).await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{AgentResponse, AgentRuntime, ResponseShapeError};
pub use factory::{agent_spec, build_agent, resolve_tools};
pub use providers::{AixplainAgent, AixplainClient};
pub use types::{AgentSpec, ToolSpec};
