//! Index command handlers.

use super::print_json;
use aixp_core::{config::AppConfig, AppResult};
use aixp_knowledge::create_index_service;
use clap::Args;

/// Create a new index
#[derive(Args, Debug)]
pub struct CreateIndexCommand {
    /// Index name
    pub name: String,

    /// Index description
    #[arg(long, default_value = "")]
    pub description: String,
}

impl CreateIndexCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing create-index command for '{}'", self.name);

        let service = create_index_service(config)?;
        let info = service.create(&self.name, &self.description).await?;

        print_json(&info)
    }
}

/// Search an index
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// Index ID or name
    pub index: String,

    /// Query text
    pub query: String,

    /// Number of results to retrieve
    #[arg(short = 'k', long, default_value = "5")]
    pub top_k: usize,
}

impl SearchCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing search command on index '{}'", self.index);

        let service = create_index_service(config)?;
        let result = service.search(&self.index, &self.query, self.top_k).await?;

        print_json(&result)
    }
}
