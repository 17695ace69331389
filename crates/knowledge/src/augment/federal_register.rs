//! Federal Register document search.

use super::{http_client, DocumentFetcher, FetchedDocument};
use aixp_core::{AppError, AppResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

pub const FEDERAL_REGISTER_SEARCH_URL: &str = "https://www.federalregister.gov/api/v1/documents.json";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<DocumentRecord>,
}

#[derive(Debug, Deserialize)]
struct DocumentRecord {
    title: Option<String>,
    excerpt: Option<String>,
    summary: Option<String>,
    html_url: Option<String>,
    pdf_url: Option<String>,
}

impl DocumentRecord {
    /// Records without a title or a link are dropped.
    fn into_document(self) -> Option<FetchedDocument> {
        let title = non_empty(self.title)?;
        let source = non_empty(self.html_url).or_else(|| non_empty(self.pdf_url))?;
        let snippet = non_empty(self.excerpt)
            .or_else(|| non_empty(self.summary))
            .unwrap_or_default();

        Some(FetchedDocument {
            source,
            title,
            snippet,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Client for the public Federal Register documents API.
#[derive(Debug, Clone)]
pub struct FederalRegisterFetcher {
    client: reqwest::Client,
    url: String,
}

impl FederalRegisterFetcher {
    pub fn new(timeout: Duration) -> AppResult<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            url: FEDERAL_REGISTER_SEARCH_URL.to_string(),
        })
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

fn map_response(response: SearchResponse) -> Vec<FetchedDocument> {
    response
        .results
        .into_iter()
        .filter_map(DocumentRecord::into_document)
        .collect()
}

#[async_trait]
impl DocumentFetcher for FederalRegisterFetcher {
    fn name(&self) -> &str {
        "federal-register"
    }

    async fn fetch(&self, query: &str, per_page: usize) -> AppResult<Vec<FetchedDocument>> {
        tracing::debug!("Federal Register search: {:?} (per_page: {})", query, per_page);

        let response = self
            .client
            .get(&self.url)
            .query(&[("per_page", per_page.to_string()), ("search", query.to_string())])
            .send()
            .await
            .map_err(|e| AppError::Fetch(format!("Federal Register request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AppError::Fetch(format!("Federal Register returned an error: {}", e)))?;

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Fetch(format!("Failed to parse Federal Register response: {}", e)))?;

        Ok(map_response(body))
    }
}
