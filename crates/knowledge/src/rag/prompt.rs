//! RAG prompt assembly.

use crate::types::{Citation, Context};

const INSTRUCTIONS: &str = "You are a helpful assistant. Use ONLY the provided context to answer the question.\nIf the answer isn't in the context, say you don't know.";

const ANSWER_STYLE: &str = "Answer concisely and cite sources by [Doc #].";

/// Render contexts as numbered `[Doc i] (source) text` blocks.
pub fn context_block(contexts: &[Context]) -> String {
    contexts
        .iter()
        .enumerate()
        .map(|(i, context)| format!("[Doc {}] ({}) {}", i + 1, context.source, context.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the grounded prompt sent to the agent.
pub fn build_prompt(question: &str, contexts: &[Context]) -> String {
    format!(
        "{}\n\nContext:\n{}\n\nQuestion: {}\n{}",
        INSTRUCTIONS,
        context_block(contexts),
        question,
        ANSWER_STYLE
    )
}

/// One citation per context, in prompt order.
pub fn citations(contexts: &[Context]) -> Vec<Citation> {
    contexts.iter().map(Citation::from).collect()
}
