//! aixp Core Library
//!
//! This crate provides the foundational utilities for the aixp CLI:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management
//! - Localized CLI strings

pub mod config;
pub mod error;
pub mod i18n;
pub mod logging;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};
