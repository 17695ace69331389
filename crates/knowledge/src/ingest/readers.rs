//! Document reader capabilities.
//!
//! PDF and HTML support are cargo features (`pdf`, `html`, both on by
//! default). The ingestor receives whatever `ReaderSet::available` reports
//! and fails with a configuration error when a capability is missing.

use aixp_core::AppResult;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Extracts text page by page.
pub trait PdfReader: Send + Sync {
    /// Text of every page, in page order.
    ///
    /// Opening the file fails as a whole; inner errors mark single pages that
    /// could not be extracted.
    fn read_pages(&self, path: &Path) -> AppResult<Vec<AppResult<String>>>;
}

/// Fetches a web page and extracts its readable text.
#[async_trait]
pub trait HtmlReader: Send + Sync {
    async fn read_text(&self, url: &str) -> AppResult<String>;
}

/// The reader capabilities an ingestor can use.
#[derive(Clone, Default)]
pub struct ReaderSet {
    pub pdf: Option<Arc<dyn PdfReader>>,
    pub html: Option<Arc<dyn HtmlReader>>,
}

impl ReaderSet {
    /// Readers compiled into this build.
    #[cfg_attr(not(feature = "html"), allow(unused_variables))]
    pub fn available(http_timeout: Duration) -> AppResult<Self> {
        #[allow(unused_mut)]
        let mut readers = Self::default();

        #[cfg(feature = "pdf")]
        {
            readers.pdf = Some(Arc::new(pdf::LopdfReader));
        }

        #[cfg(feature = "html")]
        {
            readers.html = Some(Arc::new(html::ScraperHtmlReader::new(http_timeout)?));
        }

        tracing::debug!(
            "Reader capabilities: pdf={}, html={}",
            readers.pdf.is_some(),
            readers.html.is_some()
        );
        Ok(readers)
    }
}

#[cfg(feature = "pdf")]
pub mod pdf {
    use super::PdfReader;
    use aixp_core::{AppError, AppResult};
    use std::path::Path;

    /// PDF text extraction with `lopdf`.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct LopdfReader;

    impl PdfReader for LopdfReader {
        fn read_pages(&self, path: &Path) -> AppResult<Vec<AppResult<String>>> {
            let document = lopdf::Document::load(path).map_err(|e| {
                AppError::Knowledge(format!("Failed to open PDF {}: {}", path.display(), e))
            })?;

            let pages = document
                .get_pages()
                .keys()
                .map(|&number| {
                    document.extract_text(&[number]).map_err(|e| {
                        AppError::Knowledge(format!("Failed to extract page {}: {}", number, e))
                    })
                })
                .collect();

            Ok(pages)
        }
    }
}

#[cfg(feature = "html")]
pub mod html {
    use super::HtmlReader;
    use aixp_core::{AppError, AppResult};
    use async_trait::async_trait;
    use scraper::{Html, Selector};
    use std::time::Duration;

    /// Fetches pages with `reqwest` and keeps the text of `<p>` elements.
    #[derive(Debug, Clone)]
    pub struct ScraperHtmlReader {
        client: reqwest::Client,
    }

    impl ScraperHtmlReader {
        pub fn new(timeout: Duration) -> AppResult<Self> {
            let client = reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| AppError::Fetch(format!("Failed to create HTTP client: {}", e)))?;
            Ok(Self { client })
        }
    }

    /// Paragraph text with whitespace collapsed, paragraphs separated by a
    /// blank line.
    pub fn extract_paragraphs(html: &str) -> AppResult<String> {
        let selector = Selector::parse("p")
            .map_err(|e| AppError::Knowledge(format!("Invalid selector: {}", e)))?;
        let document = Html::parse_document(html);

        let paragraphs: Vec<String> = document
            .select(&selector)
            .map(|p| {
                let text: String = p.text().collect();
                text.split_whitespace().collect::<Vec<_>>().join(" ")
            })
            .filter(|p| !p.is_empty())
            .collect();

        Ok(paragraphs.join("\n\n"))
    }

    #[async_trait]
    impl HtmlReader for ScraperHtmlReader {
        async fn read_text(&self, url: &str) -> AppResult<String> {
            let body = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| AppError::Fetch(format!("Failed to fetch {}: {}", url, e)))?
                .error_for_status()
                .map_err(|e| AppError::Fetch(format!("Fetching {} failed: {}", url, e)))?
                .text()
                .await
                .map_err(|e| AppError::Fetch(format!("Failed to read {}: {}", url, e)))?;

            extract_paragraphs(&body)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_extracts_paragraphs_only() {
            let html = r#"
                <html><head><title>Ignored</title></head>
                <body>
                  <h1>Heading</h1>
                  <p>  First <b>bold</b> paragraph. </p>
                  <div>Not a paragraph</div>
                  <p></p>
                  <p>Second.</p>
                </body></html>
            "#;

            assert_eq!(
                extract_paragraphs(html).unwrap(),
                "First bold paragraph.\n\nSecond."
            );
        }

        #[test]
        fn test_no_paragraphs_is_empty() {
            assert_eq!(extract_paragraphs("<div>text</div>").unwrap(), "");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_matches_features() {
        let readers = ReaderSet::available(Duration::from_secs(5)).unwrap();
        assert_eq!(readers.pdf.is_some(), cfg!(feature = "pdf"));
        assert_eq!(readers.html.is_some(), cfg!(feature = "html"));
    }
}
