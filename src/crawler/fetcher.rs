//! HTTP fetcher implementation
//!
//! This module handles the page request of an extraction, including:
//! - Building the HTTP client with the configured user agent and timeouts
//! - GET requests to fetch page content
//! - Error classification

use crate::config::ExecutorConfig;
use crate::crawler::CrawlError;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// A successfully fetched HTML page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,
    /// HTTP status code
    pub status_code: u16,
    /// Content-Type header value
    pub content_type: String,
    /// Page body content
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use sumi_extract::config::ExecutorConfig;
/// use sumi_extract::crawler::build_http_client;
///
/// let client = build_http_client(&ExecutorConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &ExecutorConfig) -> Result<Client, CrawlError> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(CrawlError::Client)
}

/// Fetches the target page
///
/// | Condition | Result |
/// |-----------|--------|
/// | HTTP 2xx, HTML | `Ok(FetchedPage)` |
/// | HTTP 2xx, not HTML | `ContentMismatch` |
/// | HTTP 429 | `RateLimited` |
/// | Other HTTP status | `Status` |
/// | Timeout | `Timeout` |
/// | Connection error | `Http` |
pub async fn fetch_page(client: &Client, url: &Url) -> Result<FetchedPage, CrawlError> {
    tracing::debug!("Fetching {}", url);

    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| classify_transport_error(url.as_str(), e))?;

    let status = response.status();
    let final_url = response.url().to_string();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(CrawlError::RateLimited {
            message: format!("page {} answered 429", url),
        });
    }

    if !status.is_success() {
        return Err(CrawlError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    // Missing Content-Type is accepted; servers often omit it for HTML
    if !content_type.is_empty()
        && !content_type.contains("text/html")
        && !content_type.contains("application/xhtml")
    {
        return Err(CrawlError::ContentMismatch {
            url: url.to_string(),
            content_type,
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| classify_transport_error(url.as_str(), e))?;

    tracing::debug!("Fetched {} ({} bytes)", final_url, body.len());

    Ok(FetchedPage {
        final_url,
        status_code: status.as_u16(),
        content_type,
        body,
    })
}

/// Maps a reqwest failure to a crawl error, keeping timeouts distinct
pub(crate) fn classify_transport_error(url: &str, error: reqwest::Error) -> CrawlError {
    if error.is_timeout() {
        CrawlError::Timeout {
            context: format!("request to {}", url),
        }
    } else {
        CrawlError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
