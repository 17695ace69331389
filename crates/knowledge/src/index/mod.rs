//! Index services: where chunks are stored and searched.
//!
//! Two backends share one trait. `aixplain` talks to hosted indexes on the
//! platform; `local` keeps a SQLite file per index inside the workspace.

mod aixplain;
mod local;
pub mod vectors;

pub use aixplain::AixplainIndex;
pub use local::LocalIndex;

use crate::types::{Chunk, IndexInfo};
use aixp_core::{AppConfig, AppError, AppResult};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Create, fill and query indexes.
#[async_trait]
pub trait IndexService: Send + Sync {
    /// Backend name, e.g. `local`.
    fn backend(&self) -> &str;

    async fn create(&self, name: &str, description: &str) -> AppResult<IndexInfo>;

    /// Store chunks; returns the number the backend reports as ingested.
    async fn ingest(&self, index_id: &str, chunks: &[Chunk]) -> AppResult<usize>;

    /// Search an index. The result is a search envelope (see `search_envelope`).
    async fn search(&self, index_id: &str, query: &str, top_k: usize) -> AppResult<Value>;
}

/// Wrap backend results in the common envelope
/// `{index_id, query, results, top_k}`.
pub fn search_envelope(index_id: &str, query: &str, results: Value, top_k: usize) -> Value {
    json!({
        "index_id": index_id,
        "query": query,
        "results": results,
        "top_k": top_k,
    })
}

/// Build the index service selected by `index_backend`.
pub fn create_index_service(config: &AppConfig) -> AppResult<Arc<dyn IndexService>> {
    match config.index_backend.as_str() {
        "aixplain" => {
            let api_key = config.require_api_key()?;
            let index = AixplainIndex::new(
                &config.aixplain.backend_url,
                &config.aixplain.models_url,
                api_key,
                Duration::from_secs(config.http_timeout_secs),
                Duration::from_secs(config.aixplain.run_timeout_secs),
            )?;
            Ok(Arc::new(index))
        }
        "local" => Ok(Arc::new(LocalIndex::new(config.local_index_dir()))),
        other => Err(AppError::Config(format!(
            "Unknown index backend '{}'. Use 'aixplain' or 'local'.",
            other
        ))),
    }
}
