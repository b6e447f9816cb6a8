//! Crawler module for page fetching and AI extraction
//!
//! This module contains everything between a built job and raw candidate
//! records:
//! - the [`CrawlExecutor`] seam the pipeline depends on
//! - HTTP fetching of the target page
//! - HTML to markdown conversion and token-budgeted chunking
//! - chat-completions requests to the extraction provider
//! - a fixed test double

mod chunker;
mod content;
mod executor;
mod fetcher;
mod fixed;
mod llm;
mod usage;

pub use chunker::{chunk_text, estimate_tokens};
pub use content::{clean_html, html_to_markdown};
pub use executor::LlmCrawlExecutor;
pub use fetcher::{build_http_client, fetch_page, FetchedPage};
pub use fixed::FixedExecutor;
pub use llm::{parse_candidates, CompletionOptions};
pub use usage::{TokenUsage, UsageMetrics};

use crate::job::ExtractionJob;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors from the fetch + extraction collaborator
///
/// The pipeline treats all of these as one opaque failure mode; the
/// variants exist for logging.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    #[error("Content mismatch for {url}: expected HTML, got '{content_type}'")]
    ContentMismatch { url: String, content_type: String },

    #[error("Page {url} has no extractable text")]
    EmptyPage { url: String },

    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    #[error("Provider returned HTTP {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Timed out: {context}")]
    Timeout { context: String },
}

impl CrawlError {
    /// Whether repeating the execution could succeed
    ///
    /// Rejected credentials, missing pages and pages without usable content
    /// fail the same way every time.
    pub fn is_transient(&self) -> bool {
        match self {
            CrawlError::Http { .. }
            | CrawlError::RateLimited { .. }
            | CrawlError::MalformedResponse(_)
            | CrawlError::Timeout { .. } => true,
            CrawlError::Status { status, .. } | CrawlError::Provider { status, .. } => {
                matches!(status, 408 | 409 | 429) || *status >= 500
            }
            CrawlError::Client(_)
            | CrawlError::ContentMismatch { .. }
            | CrawlError::EmptyPage { .. } => false,
        }
    }
}

/// Raw result of one execution
#[derive(Debug, Clone, Default)]
pub struct CrawlOutput {
    /// Untyped candidate records, in extraction order
    pub candidates: Vec<Value>,
    /// Usage reported by the provider
    pub usage: UsageMetrics,
}

/// Performs the page fetch and AI extraction for a job
#[async_trait]
pub trait CrawlExecutor: Send + Sync {
    async fn execute(&self, job: &ExtractionJob) -> Result<CrawlOutput, CrawlError>;

    /// Short name used in logs
    fn name(&self) -> &str;
}
