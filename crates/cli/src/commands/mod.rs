//! Command handlers for the aixp CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod chat;
pub mod demo;
pub mod index;
pub mod ingest;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use demo::DemoCommand;
pub use index::{CreateIndexCommand, SearchCommand};
pub use ingest::{IngestDatasetCommand, IngestPdfCommand, IngestWebsiteCommand};

use aixp_core::{config::AppConfig, i18n, AppError, AppResult};

/// Fail with the localized hint when no API key is configured.
pub(crate) fn require_api_key(config: &AppConfig, lang: &str) -> AppResult<()> {
    if config.api_key.is_none() {
        eprintln!("{}", i18n::t("error.no_api_key", lang));
        return Err(AppError::Config("AIXPLAIN_API_KEY is not set".to_string()));
    }
    Ok(())
}

/// Pretty-print a serializable value as JSON on stdout.
pub(crate) fn print_json(value: &impl serde::Serialize) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
