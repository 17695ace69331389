//! Retrieval-augmented answering over an index with an agent.

pub mod ask;
pub mod prompt;

pub use ask::answer;
pub use prompt::{build_prompt, citations, context_block};
