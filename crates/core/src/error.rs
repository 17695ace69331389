//! Error types for the aixp CLI.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application: configuration, I/O, agent runtime, index service,
//! ingestion, external fetchers and serialization.

use thiserror::Error;

/// Unified error type for the aixp CLI.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors, including missing capabilities
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Agent runtime errors (creation, run, polling)
    #[error("Agent error: {0}")]
    Agent(String),

    /// Index service errors (create, ingest, search)
    #[error("Index error: {0}")]
    Index(String),

    /// Ingestion and document reading errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// External document fetcher errors
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
