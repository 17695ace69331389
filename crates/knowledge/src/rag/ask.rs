//! RAG answering orchestration.
//!
//! Retrieves contexts from an index, tops them up from external sources when
//! the index comes back short, and asks the agent for a cited answer.

use super::prompt::{build_prompt, citations};
use crate::augment::ContextAugmenter;
use crate::context::normalize;
use crate::index::IndexService;
use crate::types::{AskOptions, Context, RagAnswer, EXTERNAL_SOURCE};
use aixp_agent::AgentRuntime;
use aixp_core::AppResult;

/// Answer a question grounded in index and external contexts.
///
/// This function:
/// 1. Searches the index for `top_k` results and normalizes them
/// 2. Fills the remaining budget from the context augmenter
/// 3. Builds the numbered-context prompt and runs the agent once
/// 4. Pairs the answer text with one citation per context
///
/// Index and agent failures propagate; augmentation never fails.
pub async fn answer(
    agent: &dyn AgentRuntime,
    index: &dyn IndexService,
    augmenter: &ContextAugmenter,
    options: AskOptions,
) -> AppResult<RagAnswer> {
    tracing::info!(
        "RAG answering over index '{}' (top_k: {}): {}",
        options.index_id,
        options.top_k,
        options.question
    );

    let result = index
        .search(&options.index_id, &options.question, options.top_k)
        .await?;
    let mut contexts = normalize(&result);
    let from_index = contexts.len();

    let remaining = options.top_k.saturating_sub(from_index);
    let extra = augmenter.augment(&options.question, remaining).await;
    contexts.extend(extra.into_iter().map(|context| {
        if context.source.is_empty() {
            Context::new(context.text, EXTERNAL_SOURCE)
        } else {
            context
        }
    }));

    tracing::info!(
        "Using {} contexts ({} from index, {} external)",
        contexts.len(),
        from_index,
        contexts.len() - from_index
    );

    let prompt = build_prompt(&options.question, &contexts);
    tracing::debug!("Prompt: {} chars", prompt.chars().count());

    let response = agent.run(&prompt, None).await?;

    Ok(RagAnswer {
        answer: response.text(),
        citations: citations(&contexts),
    })
}
