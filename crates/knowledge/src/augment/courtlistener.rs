//! CourtListener opinion search.

use super::{http_client, DocumentFetcher, FetchedDocument};
use aixp_core::{AppError, AppResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

pub const COURTLISTENER_SEARCH_URL: &str = "https://www.courtlistener.com/api/rest/v3/search/";

const COURTLISTENER_ORIGIN: &str = "https://www.courtlistener.com";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<OpinionRecord>,
}

#[derive(Debug, Deserialize)]
struct OpinionRecord {
    #[serde(rename = "caseName")]
    case_name: Option<String>,
    snippet: Option<String>,
    absolute_url: Option<String>,
}

impl OpinionRecord {
    fn into_document(self) -> Option<FetchedDocument> {
        let path = self.absolute_url.filter(|p| !p.is_empty())?;
        let source = if path.starts_with('/') {
            format!("{}{}", COURTLISTENER_ORIGIN, path)
        } else {
            path.clone()
        };
        let title = self.case_name.filter(|n| !n.is_empty()).unwrap_or(path);

        Some(FetchedDocument {
            source,
            title,
            snippet: self.snippet.unwrap_or_default(),
        })
    }
}

/// Client for the CourtListener search API.
///
/// Anonymous access works with lower rate limits; a token is sent when set.
#[derive(Debug, Clone)]
pub struct CourtListenerFetcher {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl CourtListenerFetcher {
    pub fn new(timeout: Duration, token: Option<String>) -> AppResult<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            url: COURTLISTENER_SEARCH_URL.to_string(),
            token: token.filter(|t| !t.is_empty()),
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
        .filter_map(OpinionRecord::into_document)
        .collect()
}

#[async_trait]
impl DocumentFetcher for CourtListenerFetcher {
    fn name(&self) -> &str {
        "courtlistener"
    }

    async fn fetch(&self, query: &str, per_page: usize) -> AppResult<Vec<FetchedDocument>> {
        tracing::debug!("CourtListener search: {:?} (page_size: {})", query, per_page);

        let mut request = self
            .client
            .get(&self.url)
            .query(&[("q", query.to_string()), ("page_size", per_page.to_string())]);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Token {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Fetch(format!("CourtListener request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AppError::Fetch(format!("CourtListener returned an error: {}", e)))?;

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Fetch(format!("Failed to parse CourtListener response: {}", e)))?;

        Ok(map_response(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Vec<FetchedDocument> {
        map_response(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn test_relative_paths_are_absolutized() {
        let docs = parse(json!({
            "results": [
                {"caseName": "Roe v. Doe", "snippet": "held that", "absolute_url": "/opinion/1/roe/"},
                {"caseName": "Elsewhere", "absolute_url": "https://mirror/op/2"}
            ]
        }));

        assert_eq!(docs[0].source, "https://www.courtlistener.com/opinion/1/roe/");
        assert_eq!(docs[0].title, "Roe v. Doe");
        assert_eq!(docs[0].snippet, "held that");
        assert_eq!(docs[1].source, "https://mirror/op/2");
        assert_eq!(docs[1].snippet, "");
    }

    #[test]
    fn test_title_falls_back_to_path() {
        let docs = parse(json!({"results": [{"absolute_url": "/opinion/9/"}]}));
        assert_eq!(docs[0].title, "/opinion/9/");
    }

    #[test]
    fn test_results_without_url_are_dropped() {
        let docs = parse(json!({"results": [{"caseName": "No link", "snippet": "x"}]}));
        assert!(docs.is_empty());
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let fetcher = CourtListenerFetcher::new(Duration::from_secs(5), Some(String::new())).unwrap();
        assert!(fetcher.token.is_none());
    }
}
