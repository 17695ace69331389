//! Ingestion command handlers.
//!
//! Each command prints a JSON summary and posts the chunk count to Slack when
//! a webhook is configured.

use super::print_json;
use aixp_core::{config::AppConfig, AppResult};
use aixp_knowledge::{create_index_service, Ingestor, IngestStats, SlackNotifier};
use clap::Args;
use serde_json::json;
use std::path::PathBuf;

fn ingestor(config: &AppConfig) -> AppResult<Ingestor> {
    let service = create_index_service(config)?;
    Ingestor::from_config(service, config)
}

async fn report(config: &AppConfig, index: &str, source: &str, stats: &IngestStats) -> AppResult<()> {
    print_json(&json!({
        "index": index,
        "ingested": stats.chunks_ingested,
        "source": source,
        "units": stats.units_ingested,
        "skipped": stats.units_empty + stats.units_failed,
    }))?;

    SlackNotifier::new(config.slack_webhook.clone())?
        .notify(&format!(
            "Ingested {} chunks from {} into index {}",
            stats.chunks_ingested, source, index
        ))
        .await;

    Ok(())
}

/// Ingest a local PDF into an index
#[derive(Args, Debug)]
pub struct IngestPdfCommand {
    /// Index ID or name
    pub index: String,

    /// Path to PDF file
    pub path: PathBuf,

    /// Ingest each page as a single document
    #[arg(long)]
    pub no_chunk: bool,
}

impl IngestPdfCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest-pdf command for {:?}", self.path);

        let stats = ingestor(config)?
            .ingest_pdf(&self.index, &self.path, !self.no_chunk)
            .await?;

        report(config, &self.index, &self.path.to_string_lossy(), &stats).await
    }
}

/// Ingest the paragraphs of a web page into an index
#[derive(Args, Debug)]
pub struct IngestWebsiteCommand {
    /// Index ID or name
    pub index: String,

    /// Page URL
    pub url: String,

    /// Ingest the page as a single document
    #[arg(long)]
    pub no_chunk: bool,
}

impl IngestWebsiteCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest-website command for {}", self.url);

        let stats = ingestor(config)?
            .ingest_website(&self.index, &self.url, !self.no_chunk)
            .await?;

        report(config, &self.index, &self.url, &stats).await
    }
}

/// Ingest a CSV or JSON dataset into an index
#[derive(Args, Debug)]
pub struct IngestDatasetCommand {
    /// Index ID or name
    pub index: String,

    /// Path to a .csv or .json file
    pub path: PathBuf,

    /// Column to use as text (repeatable; default: all text columns)
    #[arg(long = "text-column")]
    pub text_columns: Vec<String>,

    /// Ingest each row as a single document
    #[arg(long)]
    pub no_chunk: bool,
}

impl IngestDatasetCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest-dataset command for {:?}", self.path);

        let columns = (!self.text_columns.is_empty()).then_some(self.text_columns.as_slice());
        let stats = ingestor(config)?
            .ingest_dataset(&self.index, &self.path, columns, !self.no_chunk)
            .await?;

        report(config, &self.index, &self.path.to_string_lossy(), &stats).await
    }
}
