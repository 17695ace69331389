//! Retrieval and ingestion for aixp.
//!
//! Documents are chunked and pushed into an index service; questions are
//! answered by normalizing index hits into contexts, topping them up from
//! external legal sources and asking an agent for a cited answer.

pub mod augment;
pub mod chunker;
pub mod context;
pub mod index;
pub mod ingest;
pub mod notify;
pub mod rag;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use augment::{ContextAugmenter, DocumentFetcher, FetchedDocument};
pub use chunker::{chunk_text, ChunkConfig};
pub use context::{normalize, ResultItem};
pub use index::{create_index_service, IndexService};
pub use ingest::{Ingestor, ReaderSet};
pub use notify::SlackNotifier;
pub use rag::answer;
pub use types::{AskOptions, Chunk, ChunkMeta, Citation, Context, IndexInfo, IngestStats, RagAnswer};
