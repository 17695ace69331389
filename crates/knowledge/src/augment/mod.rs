//! External context augmentation.
//!
//! Questions mentioning regulations or court cases pull extra evidence from
//! public legal sources. Failures never reach the caller: a source that
//! errors contributes nothing.

mod courtlistener;
mod federal_register;

pub use courtlistener::{CourtListenerFetcher, COURTLISTENER_SEARCH_URL};
pub use federal_register::{FederalRegisterFetcher, FEDERAL_REGISTER_SEARCH_URL};

use crate::types::Context;
use aixp_core::{AppConfig, AppResult};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Keywords routing a question to the regulatory source.
const REGULATORY_KEYWORDS: [&str; 2] = ["federal register", "regulation"];

/// Keywords routing a question to the case-law source.
const CASE_LAW_KEYWORDS: [&str; 3] = ["court", "case", "opinion"];

/// A document returned by an external search API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    pub source: String,
    pub title: String,
    pub snippet: String,
}

impl FetchedDocument {
    fn into_context(self) -> Context {
        Context::new(format!("{}: {}", self.title, self.snippet), self.source)
    }
}

/// A searchable external document source.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Search for documents, asking for at most `per_page` results.
    async fn fetch(&self, query: &str, per_page: usize) -> AppResult<Vec<FetchedDocument>>;
}

/// Routes questions to external sources and merges their results.
#[derive(Clone, Default)]
pub struct ContextAugmenter {
    regulatory: Option<Arc<dyn DocumentFetcher>>,
    case_law: Option<Arc<dyn DocumentFetcher>>,
}

impl ContextAugmenter {
    pub fn new(
        regulatory: Option<Arc<dyn DocumentFetcher>>,
        case_law: Option<Arc<dyn DocumentFetcher>>,
    ) -> Self {
        Self {
            regulatory,
            case_law,
        }
    }

    /// An augmenter with no sources; always returns nothing.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Federal Register and CourtListener, built from configuration.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let timeout = Duration::from_secs(config.http_timeout_secs);
        let regulatory = FederalRegisterFetcher::new(timeout)?;
        let case_law = CourtListenerFetcher::new(timeout, config.courtlistener_token.clone())?;

        Ok(Self::new(Some(Arc::new(regulatory)), Some(Arc::new(case_law))))
    }

    /// Fetch up to `max_items` contexts from each source the question routes to.
    ///
    /// Regulatory results always precede case-law results.
    pub async fn augment(&self, question: &str, max_items: usize) -> Vec<Context> {
        if max_items == 0 {
            return Vec::new();
        }

        let lowered = question.to_lowercase();
        let regulatory = self
            .regulatory
            .as_deref()
            .filter(|_| mentions_any(&lowered, &REGULATORY_KEYWORDS));
        let case_law = self
            .case_law
            .as_deref()
            .filter(|_| mentions_any(&lowered, &CASE_LAW_KEYWORDS));

        if regulatory.is_none() && case_law.is_none() {
            tracing::debug!("Question routes to no external source");
            return Vec::new();
        }

        let (mut contexts, case_law) = futures::join!(
            fetch_contexts(regulatory, question, max_items),
            fetch_contexts(case_law, question, max_items),
        );
        contexts.extend(case_law);

        tracing::debug!("Augmented with {} external contexts", contexts.len());
        contexts
    }
}

fn mentions_any(lowered: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| lowered.contains(keyword))
}

async fn fetch_contexts(
    fetcher: Option<&dyn DocumentFetcher>,
    question: &str,
    max_items: usize,
) -> Vec<Context> {
    let Some(fetcher) = fetcher else {
        return Vec::new();
    };

    match fetcher.fetch(question, max_items).await {
        Ok(documents) => documents
            .into_iter()
            .take(max_items)
            .map(FetchedDocument::into_context)
            .collect(),
        Err(e) => {
            tracing::warn!("External fetch from {} failed: {}", fetcher.name(), e);
            Vec::new()
        }
    }
}

/// Build an HTTP client with the given timeout.
pub(crate) fn http_client(timeout: Duration) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| aixp_core::AppError::Fetch(format!("Failed to create HTTP client: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fakes::FakeFetcher;

    fn doc(source: &str, title: &str) -> FetchedDocument {
        FetchedDocument {
            source: source.to_string(),
            title: title.to_string(),
            snippet: "snip".to_string(),
        }
    }

    fn augmenter(regulatory: &Arc<FakeFetcher>, case_law: &Arc<FakeFetcher>) -> ContextAugmenter {
        ContextAugmenter::new(Some(regulatory.clone()), Some(case_law.clone()))
    }

    #[tokio::test]
    async fn test_zero_budget_makes_no_calls() {
        let regulatory = Arc::new(FakeFetcher::returning(vec![doc("fr", "Rule")]));
        let case_law = Arc::new(FakeFetcher::returning(vec![doc("cl", "Case")]));

        let contexts = augmenter(&regulatory, &case_law)
            .augment("federal register court case", 0)
            .await;

        assert!(contexts.is_empty());
        assert_eq!(regulatory.calls(), 0);
        assert_eq!(case_law.calls(), 0);
    }

    #[tokio::test]
    async fn test_unrouted_question_makes_no_calls() {
        let regulatory = Arc::new(FakeFetcher::returning(vec![doc("fr", "Rule")]));
        let case_law = Arc::new(FakeFetcher::returning(vec![doc("cl", "Case")]));

        let contexts = augmenter(&regulatory, &case_law)
            .augment("What is agentic RAG?", 5)
            .await;

        assert!(contexts.is_empty());
        assert_eq!(regulatory.calls(), 0);
        assert_eq!(case_law.calls(), 0);
    }

    #[tokio::test]
    async fn test_routing_is_case_insensitive() {
        let regulatory = Arc::new(FakeFetcher::returning(vec![doc("fr", "Rule")]));
        let case_law = Arc::new(FakeFetcher::returning(vec![doc("cl", "Case")]));

        let contexts = augmenter(&regulatory, &case_law)
            .augment("Which REGULATION applies?", 5)
            .await;

        assert_eq!(contexts, vec![Context::new("Rule: snip", "fr")]);
        assert_eq!(regulatory.calls(), 1);
        assert_eq!(case_law.calls(), 0);
        assert_eq!(regulatory.last_per_page(), Some(5));
    }

    #[tokio::test]
    async fn test_both_routes_regulatory_first() {
        let regulatory = Arc::new(FakeFetcher::returning(vec![doc("fr1", "R1"), doc("fr2", "R2")]));
        let case_law = Arc::new(FakeFetcher::returning(vec![doc("cl1", "C1")]));

        let contexts = augmenter(&regulatory, &case_law)
            .augment("Court opinion on a federal register notice", 5)
            .await;

        let sources: Vec<&str> = contexts.iter().map(|c| c.source.as_str()).collect();
        assert_eq!(sources, vec!["fr1", "fr2", "cl1"]);
    }

    #[tokio::test]
    async fn test_each_source_truncated_to_budget() {
        let many: Vec<FetchedDocument> = (0..4).map(|i| doc(&format!("s{}", i), "T")).collect();
        let regulatory = Arc::new(FakeFetcher::returning(many.clone()));
        let case_law = Arc::new(FakeFetcher::returning(many));

        let contexts = augmenter(&regulatory, &case_law)
            .augment("regulation and case", 2)
            .await;

        assert_eq!(contexts.len(), 4);
        assert_eq!(case_law.last_per_page(), Some(2));
    }

    #[tokio::test]
    async fn test_failing_source_only_drops_its_results() {
        let regulatory = Arc::new(FakeFetcher::failing());
        let case_law = Arc::new(FakeFetcher::returning(vec![doc("cl", "Case")]));

        let contexts = augmenter(&regulatory, &case_law)
            .augment("regulation in court", 3)
            .await;

        assert_eq!(contexts, vec![Context::new("Case: snip", "cl")]);
        assert_eq!(regulatory.calls(), 1);
    }

    #[tokio::test]
    async fn test_disabled_augmenter() {
        let contexts = ContextAugmenter::disabled().augment("court case", 5).await;
        assert!(contexts.is_empty());
    }
}
