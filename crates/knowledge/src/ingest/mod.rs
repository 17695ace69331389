//! Ingestion orchestration.
//!
//! Sources are split into units (PDF pages, a web page, dataset rows). Each
//! unit is trimmed, optionally chunked, given deterministic chunk ids and
//! forwarded to the index in batches. A unit that fails is logged and
//! skipped so one bad page never aborts a whole document.

pub mod dataset;
pub mod readers;

pub use dataset::{Dataset, DatasetFormat};
pub use readers::{HtmlReader, PdfReader, ReaderSet};

use crate::chunker::{chunk_text, ChunkConfig};
use crate::index::IndexService;
use crate::types::{Chunk, ChunkMeta, IngestStats};
use aixp_core::{AppConfig, AppError, AppResult};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Default number of chunks per ingest call.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Position of a unit within its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    /// 1-based PDF page
    Page(u32),
    /// 0-based dataset row
    Row(u64),
    /// The whole source
    Document,
}

impl Unit {
    fn chunk_id(&self, source: &str, part: Option<usize>) -> String {
        let base = match self {
            Unit::Page(page) => format!("{}#p{}", source, page),
            Unit::Row(row) => format!("{}#{}", source, row),
            Unit::Document => source.to_string(),
        };

        match (self, part) {
            (_, None) => base,
            (Unit::Document, Some(j)) => format!("{}#{}", base, j),
            (_, Some(j)) => format!("{}-{}", base, j),
        }
    }

    fn meta(&self, source: &str) -> ChunkMeta {
        ChunkMeta {
            source: source.to_string(),
            page: match self {
                Unit::Page(page) => Some(*page),
                _ => None,
            },
            row: match self {
                Unit::Row(row) => Some(*row),
                _ => None,
            },
        }
    }
}

/// Build the chunks for one unit of text.
fn unit_chunks(
    text: &str,
    source: &str,
    unit: Unit,
    chunking: Option<&ChunkConfig>,
) -> Vec<Chunk> {
    let meta = unit.meta(source);

    match chunking {
        Some(config) => chunk_text(text, config)
            .into_iter()
            .enumerate()
            .map(|(j, part)| Chunk {
                id: unit.chunk_id(source, Some(j)),
                text: part,
                meta: meta.clone(),
            })
            .collect(),
        None => vec![Chunk {
            id: unit.chunk_id(source, None),
            text: text.to_string(),
            meta,
        }],
    }
}

/// Feeds documents into an index service.
pub struct Ingestor {
    sink: Arc<dyn IndexService>,
    chunking: ChunkConfig,
    batch_size: usize,
    readers: ReaderSet,
}

impl Ingestor {
    /// An ingestor with default batch size and no readers.
    pub fn new(sink: Arc<dyn IndexService>, chunking: ChunkConfig) -> Self {
        Self {
            sink,
            chunking,
            batch_size: DEFAULT_BATCH_SIZE,
            readers: ReaderSet::default(),
        }
    }

    /// An ingestor configured from `AppConfig`, with every reader compiled in.
    pub fn from_config(sink: Arc<dyn IndexService>, config: &AppConfig) -> AppResult<Self> {
        let readers = ReaderSet::available(Duration::from_secs(config.http_timeout_secs))?;
        Ok(Self::new(sink, ChunkConfig::try_from(&config.chunking)?)
            .with_batch_size(config.ingest_batch_size)
            .with_readers(readers))
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_readers(mut self, readers: ReaderSet) -> Self {
        self.readers = readers;
        self
    }

    /// Ingest every page of a PDF.
    pub async fn ingest_pdf(&self, index_id: &str, path: &Path, chunk: bool) -> AppResult<IngestStats> {
        let reader = self.readers.pdf.as_ref().ok_or_else(|| {
            AppError::Config(
                "PDF support is not available in this build. Rebuild with `--features pdf`."
                    .to_string(),
            )
        })?;

        let source = path.to_string_lossy();
        tracing::info!("Ingesting PDF {} into {}", source, index_id);

        let pages = reader.read_pages(path)?;
        let mut stats = IngestStats::default();

        for (i, page) in pages.into_iter().enumerate() {
            let unit = Unit::Page(i as u32 + 1);
            match page {
                Ok(text) => self.ingest_unit(index_id, &text, &source, unit, chunk, &mut stats).await,
                Err(e) => {
                    tracing::warn!("Skipping page {} of {}: {}", i + 1, source, e);
                    stats.units_failed += 1;
                }
            }
        }

        log_stats(&source, &stats);
        Ok(stats)
    }

    /// Ingest the paragraph text of a web page as one document.
    pub async fn ingest_website(&self, index_id: &str, url: &str, chunk: bool) -> AppResult<IngestStats> {
        let reader = self.readers.html.as_ref().ok_or_else(|| {
            AppError::Config(
                "HTML support is not available in this build. Rebuild with `--features html`."
                    .to_string(),
            )
        })?;

        tracing::info!("Ingesting website {} into {}", url, index_id);
        let mut stats = IngestStats::default();

        match reader.read_text(url).await {
            Ok(text) => {
                self.ingest_unit(index_id, &text, url, Unit::Document, chunk, &mut stats)
                    .await
            }
            Err(e) => {
                tracing::warn!("Skipping {}: {}", url, e);
                stats.units_failed += 1;
            }
        }

        log_stats(url, &stats);
        Ok(stats)
    }

    /// Ingest a CSV or JSON dataset, one unit per row.
    ///
    /// Without `text_columns`, every textual column is used.
    pub async fn ingest_dataset(
        &self,
        index_id: &str,
        path: &Path,
        text_columns: Option<&[String]>,
        chunk: bool,
    ) -> AppResult<IngestStats> {
        let source = path.to_string_lossy();
        tracing::info!("Ingesting dataset {} into {}", source, index_id);

        let dataset = Dataset::load(path)?;
        let mut stats = IngestStats::default();
        if dataset.is_empty() {
            tracing::info!("Dataset {} has no rows", source);
            return Ok(stats);
        }

        let columns = dataset.resolve_columns(text_columns)?;
        tracing::debug!("Text columns: {:?}", columns);

        for (i, row) in dataset.rows.iter().enumerate() {
            let text = dataset::row_text(row, &columns);
            self.ingest_unit(index_id, &text, &source, Unit::Row(i as u64), chunk, &mut stats)
                .await;
        }

        log_stats(&source, &stats);
        Ok(stats)
    }

    async fn ingest_unit(
        &self,
        index_id: &str,
        text: &str,
        source: &str,
        unit: Unit,
        chunk: bool,
        stats: &mut IngestStats,
    ) {
        let text = text.trim();
        if text.is_empty() {
            stats.units_empty += 1;
            return;
        }

        let chunks = unit_chunks(text, source, unit, chunk.then_some(&self.chunking));

        for batch in chunks.chunks(self.batch_size) {
            match self.sink.ingest(index_id, batch).await {
                Ok(count) => stats.chunks_ingested += count,
                Err(e) => {
                    tracing::warn!("Failed to ingest {:?} of {}: {}", unit, source, e);
                    stats.units_failed += 1;
                    return;
                }
            }
        }

        stats.units_ingested += 1;
    }
}

fn log_stats(source: &str, stats: &IngestStats) {
    tracing::info!(
        "Ingested {} chunks from {} ({} units, {} empty, {} failed)",
        stats.chunks_ingested,
        source,
        stats.units_ingested,
        stats.units_empty,
        stats.units_failed
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fakes::FakeIndex;
    use async_trait::async_trait;
    use std::io::Write;
    use tempfile::Builder;

    struct StaticPdf(Vec<AppResult<String>>);

    impl PdfReader for StaticPdf {
        fn read_pages(&self, _path: &Path) -> AppResult<Vec<AppResult<String>>> {
            Ok(self
                .0
                .iter()
                .map(|page| match page {
                    Ok(text) => Ok(text.clone()),
                    Err(e) => Err(AppError::Knowledge(e.to_string())),
                })
                .collect())
        }
    }

    struct StaticHtml(String);

    #[async_trait]
    impl HtmlReader for StaticHtml {
        async fn read_text(&self, _url: &str) -> AppResult<String> {
            Ok(self.0.clone())
        }
    }

    fn small_chunks() -> ChunkConfig {
        ChunkConfig::new(10, 2).unwrap()
    }

    fn ingestor(index: &Arc<FakeIndex>, readers: ReaderSet) -> Ingestor {
        Ingestor::new(index.clone(), small_chunks()).with_readers(readers)
    }

    fn with_pdf(pages: Vec<AppResult<String>>) -> ReaderSet {
        ReaderSet {
            pdf: Some(Arc::new(StaticPdf(pages))),
            html: None,
        }
    }

    #[test]
    fn test_chunk_ids() {
        assert_eq!(Unit::Page(3).chunk_id("a.pdf", Some(1)), "a.pdf#p3-1");
        assert_eq!(Unit::Page(3).chunk_id("a.pdf", None), "a.pdf#p3");
        assert_eq!(Unit::Row(0).chunk_id("d.csv", Some(2)), "d.csv#0-2");
        assert_eq!(Unit::Row(7).chunk_id("d.csv", None), "d.csv#7");
        assert_eq!(Unit::Document.chunk_id("https://x", Some(0)), "https://x#0");
        assert_eq!(Unit::Document.chunk_id("https://x", None), "https://x");
    }

    #[tokio::test]
    async fn test_pdf_pages_skip_empty_and_failed() {
        let index = Arc::new(FakeIndex::new());
        let pages = vec![
            Ok("short page".to_string()),
            Ok("   ".to_string()),
            Err(AppError::Knowledge("broken".to_string())),
            Ok("a page with more text".to_string()),
        ];

        let stats = ingestor(&index, with_pdf(pages))
            .ingest_pdf("idx", Path::new("doc.pdf"), true)
            .await
            .unwrap();

        assert_eq!(stats.units_ingested, 2);
        assert_eq!(stats.units_empty, 1);
        assert_eq!(stats.units_failed, 1);

        let ids: Vec<String> = index.ingested().iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec!["doc.pdf#p1-0", "doc.pdf#p4-0", "doc.pdf#p4-1", "doc.pdf#p4-2"]);
        assert_eq!(stats.chunks_ingested, 4);

        let page_four = &index.ingested()[1];
        assert_eq!(page_four.meta.page, Some(4));
        assert_eq!(page_four.meta.source, "doc.pdf");
    }

    #[tokio::test]
    async fn test_pdf_unchunked() {
        let index = Arc::new(FakeIndex::new());
        let stats = ingestor(&index, with_pdf(vec![Ok("  a page with more text ".to_string())]))
            .ingest_pdf("idx", Path::new("doc.pdf"), false)
            .await
            .unwrap();

        assert_eq!(stats.chunks_ingested, 1);
        let chunks = index.ingested();
        assert_eq!(chunks[0].id, "doc.pdf#p1");
        assert_eq!(chunks[0].text, "a page with more text");
    }

    #[tokio::test]
    async fn test_missing_capability_is_config_error() {
        let index = Arc::new(FakeIndex::new());
        let ingestor = ingestor(&index, ReaderSet::default());

        let pdf = ingestor.ingest_pdf("idx", Path::new("doc.pdf"), true).await;
        assert!(matches!(pdf, Err(AppError::Config(_))));

        let web = ingestor.ingest_website("idx", "https://example.com", true).await;
        assert!(matches!(web, Err(AppError::Config(_))));
        assert_eq!(index.ingest_calls(), 0);
    }

    #[tokio::test]
    async fn test_website_ids() {
        let index = Arc::new(FakeIndex::new());
        let readers = ReaderSet {
            pdf: None,
            html: Some(Arc::new(StaticHtml("First paragraph.\n\nSecond.".to_string()))),
        };

        let stats = ingestor(&index, readers)
            .ingest_website("idx", "https://example.com", true)
            .await
            .unwrap();

        let chunks = index.ingested();
        assert_eq!(chunks[0].id, "https://example.com#0");
        assert_eq!(chunks.len(), stats.chunks_ingested);
        assert!(chunks.iter().all(|c| c.meta.page.is_none() && c.meta.row.is_none()));
    }

    #[tokio::test]
    async fn test_batches_respect_batch_size() {
        let index = Arc::new(FakeIndex::new());
        let text = "x".repeat(10 + 8 * 4);

        let stats = ingestor(&index, with_pdf(vec![Ok(text)]))
            .with_batch_size(2)
            .ingest_pdf("idx", Path::new("doc.pdf"), true)
            .await
            .unwrap();

        assert_eq!(stats.chunks_ingested, 5);
        assert_eq!(index.batch_sizes(), vec![2, 2, 1]);
    }

    #[tokio::test]
    async fn test_sink_failure_skips_unit_and_continues() {
        let index = Arc::new(FakeIndex::failing_on_call(1));
        let pages = vec![Ok("page one".to_string()), Ok("page two".to_string())];

        let stats = ingestor(&index, with_pdf(pages))
            .ingest_pdf("idx", Path::new("doc.pdf"), true)
            .await
            .unwrap();

        assert_eq!(stats.units_failed, 1);
        assert_eq!(stats.units_ingested, 1);
        assert_eq!(index.ingested()[0].id, "doc.pdf#p2-0");
    }

    #[tokio::test]
    async fn test_dataset_rows() {
        let index = Arc::new(FakeIndex::new());
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "id,title,body\n1,Alpha,one\n2,,\n3,Gamma,three\n").unwrap();

        let stats = Ingestor::new(index.clone(), ChunkConfig::default())
            .ingest_dataset("idx", file.path(), None, false)
            .await
            .unwrap();

        assert_eq!(stats.units_ingested, 2);
        assert_eq!(stats.units_empty, 1);

        let chunks = index.ingested();
        let source = file.path().to_string_lossy().to_string();
        assert_eq!(chunks[0].id, format!("{}#0", source));
        assert_eq!(chunks[0].text, "Alpha\none");
        assert_eq!(chunks[1].id, format!("{}#2", source));
        assert_eq!(chunks[1].meta.row, Some(2));
    }

    #[tokio::test]
    async fn test_dataset_selected_columns_chunked() {
        let index = Arc::new(FakeIndex::new());
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"[{{"q": "question", "a": "answer"}}]"#).unwrap();

        Ingestor::new(index.clone(), ChunkConfig::default())
            .ingest_dataset("idx", file.path(), Some(&["a".to_string()]), true)
            .await
            .unwrap();

        let chunks = index.ingested();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "answer");
        assert!(chunks[0].id.ends_with("#0-0"));
    }

    #[tokio::test]
    async fn test_unsupported_dataset_type() {
        let index = Arc::new(FakeIndex::new());
        let result = Ingestor::new(index.clone(), ChunkConfig::default())
            .ingest_dataset("idx", Path::new("data.parquet"), None, true)
            .await;

        assert!(matches!(
            result,
            Err(AppError::Knowledge(msg)) if msg == "Unsupported dataset type. Use CSV or JSON."
        ));
    }
}
