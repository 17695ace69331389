//! End-to-end tests for RAG answering over fake seams.

use super::fakes::{FakeAgent, FakeFetcher, FakeIndex};
use crate::augment::{ContextAugmenter, FetchedDocument};
use crate::rag::answer;
use crate::types::{AskOptions, Context, SNIPPET_MAX_CHARS};
use aixp_core::AppError;
use serde_json::json;
use std::sync::Arc;

fn case_law_doc(i: usize) -> FetchedDocument {
    FetchedDocument {
        source: format!("https://www.courtlistener.com/opinion/{}/", i),
        title: format!("Case {}", i),
        snippet: "held".to_string(),
    }
}

#[tokio::test]
async fn test_short_index_is_topped_up_from_external_sources() {
    let index = FakeIndex::with_results(json!([
        {"text": "Agentic RAG mixes retrieval and tools.", "meta": {"source": "notes.pdf"}},
        {"content": "Courts publish opinions."}
    ]));
    let agent = FakeAgent::with_output("It combines retrieval with tools [Doc 1].");
    let case_law = Arc::new(FakeFetcher::returning((1..=4).map(case_law_doc).collect()));
    let augmenter = ContextAugmenter::new(None, Some(case_law.clone()));

    let options = AskOptions::new("idx", "Which court case covers agentic RAG?").with_top_k(3);
    let result = answer(&agent, &index, &augmenter, options).await.unwrap();

    assert_eq!(result.answer, "It combines retrieval with tools [Doc 1].");
    assert_eq!(case_law.last_per_page(), Some(1));

    let sources: Vec<&str> = result.citations.iter().map(|c| c.source.as_str()).collect();
    assert_eq!(
        sources,
        vec!["notes.pdf", "index", "https://www.courtlistener.com/opinion/1/"]
    );

    let prompts = agent.prompts();
    assert_eq!(prompts.len(), 1);
    let prompt = &prompts[0];
    assert!(prompt.contains("[Doc 1] (notes.pdf) Agentic RAG mixes retrieval and tools."));
    assert!(prompt.contains("[Doc 2] (index) Courts publish opinions."));
    assert!(prompt.contains("[Doc 3] (https://www.courtlistener.com/opinion/1/) Case 1: held"));
    assert!(!prompt.contains("[Doc 4]"));
    assert!(prompt.ends_with(
        "Question: Which court case covers agentic RAG?\nAnswer concisely and cite sources by [Doc #]."
    ));
    assert_eq!(agent.sessions(), vec![None]);
}

#[tokio::test]
async fn test_full_index_skips_external_fetch() {
    let index = FakeIndex::with_results(json!([
        {"text": "one"}, {"text": "two"}
    ]));
    let agent = FakeAgent::with_output("ok");
    let regulatory = Arc::new(FakeFetcher::returning(vec![case_law_doc(1)]));
    let augmenter = ContextAugmenter::new(Some(regulatory.clone()), None);

    let options = AskOptions::new("idx", "Which regulation applies?").with_top_k(2);
    let result = answer(&agent, &index, &augmenter, options).await.unwrap();

    assert_eq!(result.citations.len(), 2);
    assert_eq!(regulatory.calls(), 0);
}

#[tokio::test]
async fn test_plain_string_agent_reply_is_used_verbatim() {
    let index = FakeIndex::with_results(json!([{"text": "ctx"}]));
    let agent = FakeAgent::replying("raw answer".to_string());

    let result = answer(
        &agent,
        &index,
        &ContextAugmenter::disabled(),
        AskOptions::new("idx", "q"),
    )
    .await
    .unwrap();

    assert_eq!(result.answer, "raw answer");
}

#[tokio::test]
async fn test_unexpected_agent_shape_is_serialized() {
    let index = FakeIndex::new();
    let agent = FakeAgent::replying(json!({"data": {"output": 42}}));

    let result = answer(
        &agent,
        &index,
        &ContextAugmenter::disabled(),
        AskOptions::new("idx", "q"),
    )
    .await
    .unwrap();

    assert_eq!(result.answer, r#"{"data":{"output":42}}"#);
    assert!(result.citations.is_empty());
}

#[tokio::test]
async fn test_citation_snippets_are_truncated() {
    let long = "z".repeat(SNIPPET_MAX_CHARS + 20);
    let index = FakeIndex::with_results(json!([{"text": long, "meta": {"source": "big.pdf"}}]));
    let agent = FakeAgent::with_output("ok");

    let result = answer(
        &agent,
        &index,
        &ContextAugmenter::disabled(),
        AskOptions::new("idx", "q"),
    )
    .await
    .unwrap();

    assert_eq!(result.citations[0].snippet.chars().count(), SNIPPET_MAX_CHARS);
    assert!(agent.prompts()[0].contains(&long));
}

#[tokio::test]
async fn test_external_context_without_source_is_labelled() {
    let index = FakeIndex::new();
    let agent = FakeAgent::with_output("ok");
    let fetcher = Arc::new(FakeFetcher::returning(vec![FetchedDocument {
        source: String::new(),
        title: "Rule".to_string(),
        snippet: "text".to_string(),
    }]));
    let augmenter = ContextAugmenter::new(Some(fetcher), None);

    let result = answer(&agent, &index, &augmenter, AskOptions::new("idx", "regulation?"))
        .await
        .unwrap();

    assert_eq!(result.citations[0].source, "external");
    assert_eq!(
        result.citations[0],
        crate::types::Citation::from(&Context::new("Rule: text", "external"))
    );
}

#[tokio::test]
async fn test_index_failure_propagates() {
    let index = FakeIndex::failing_search();
    let agent = FakeAgent::with_output("unused");

    let result = answer(
        &agent,
        &index,
        &ContextAugmenter::disabled(),
        AskOptions::new("idx", "q"),
    )
    .await;

    assert!(matches!(result, Err(AppError::Index(_))));
    assert!(agent.prompts().is_empty());
}

#[tokio::test]
async fn test_agent_failure_propagates() {
    let index = FakeIndex::with_results(json!([{"text": "ctx"}]));
    let agent = FakeAgent::failing();

    let result = answer(
        &agent,
        &index,
        &ContextAugmenter::disabled(),
        AskOptions::new("idx", "q"),
    )
    .await;

    assert!(matches!(result, Err(AppError::Agent(_))));
    assert_eq!(index.search_calls(), 1);
}
