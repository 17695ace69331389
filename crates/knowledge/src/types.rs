//! Knowledge system type definitions.

use serde::{Deserialize, Serialize};

/// Maximum citation snippet length, in characters.
pub const SNIPPET_MAX_CHARS: usize = 280;

/// Source label for index contexts that carry no source.
pub const INDEX_SOURCE: &str = "index";

/// Source label for external contexts that carry no source.
pub const EXTERNAL_SOURCE: &str = "external";

/// A text fragment prepared for ingestion into an index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Deterministic identifier, e.g. `report.pdf#p3-1`
    pub id: String,

    /// Text content
    pub text: String,

    /// Origin of the text
    pub meta: ChunkMeta,
}

/// Where a chunk came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMeta {
    /// File path or URL
    pub source: String,

    /// 1-based PDF page number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// 0-based dataset row index
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<u64>,
}

/// A normalized unit of evidence for a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub text: String,
    pub source: String,
}

impl Context {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
        }
    }
}

/// A source-attributed excerpt returned with an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub source: String,

    /// First `SNIPPET_MAX_CHARS` characters of the context text
    pub snippet: String,
}

impl From<&Context> for Citation {
    fn from(context: &Context) -> Self {
        Self {
            source: context.source.clone(),
            snippet: context.text.chars().take(SNIPPET_MAX_CHARS).collect(),
        }
    }
}

/// Answer produced by the RAG answerer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagAnswer {
    pub answer: String,

    /// One citation per context, in prompt order
    pub citations: Vec<Citation>,
}

/// An index as reported by the index service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Options for a RAG answer.
#[derive(Debug, Clone)]
pub struct AskOptions {
    /// Index to search
    pub index_id: String,

    /// Question text
    pub question: String,

    /// Number of contexts to aim for
    pub top_k: usize,
}

impl AskOptions {
    /// Default number of contexts.
    pub const DEFAULT_TOP_K: usize = 5;

    pub fn new(index_id: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            index_id: index_id.into(),
            question: question.into(),
            top_k: Self::DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

/// Statistics from an ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestStats {
    /// Units (pages, documents, rows) whose chunks reached the sink
    pub units_ingested: u32,

    /// Units skipped because they were empty
    pub units_empty: u32,

    /// Units skipped because reading or ingesting them failed
    pub units_failed: u32,

    /// Total count reported by the sink
    pub chunks_ingested: usize,
}
