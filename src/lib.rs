//! Sumi-Extract: schema-driven table extraction from a single web page
//!
//! This crate fetches one page, asks an LLM provider (DeepSeek or ChatGPT) to
//! pull out the rows of a table matching a fixed schema, validates every
//! candidate record, and writes the survivors to a JSON file.

pub mod config;
pub mod crawler;
pub mod job;
pub mod output;
pub mod pipeline;
pub mod schema;

use thiserror::Error;

/// Main error type for Sumi-Extract operations
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Missing credential: environment variable {variable} is not set or empty")]
    MissingCredential { variable: String },

    #[error("Unsupported provider: '{0}' (expected one of: deepseek, chatgpt)")]
    UnsupportedProvider(String),

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Extraction instruction cannot be empty")]
    InvalidInstruction,

    #[error("Crawl failed: {0}")]
    CrawlFailure(#[from] crawler::CrawlError),

    #[error("No valid data: all {rejected} candidate record(s) failed validation")]
    NoValidData { rejected: usize },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Sumi-Extract operations
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, Provider, ProviderConfig};
pub use crawler::{CrawlExecutor, CrawlOutput, UsageMetrics};
pub use job::ExtractionJob;
pub use output::{process, ResultSet};
pub use schema::{FieldSpec, FieldType, Record, Schema, SchemaValidationError};
