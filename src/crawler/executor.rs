//! Production crawl executor: fetch, convert, chunk, extract

use crate::config::ExecutorConfig;
use crate::crawler::chunker::{chunk_text, estimate_tokens};
use crate::crawler::content::html_to_markdown;
use crate::crawler::fetcher::{build_http_client, fetch_page};
use crate::crawler::llm::{request_extraction, system_prompt, user_prompt, CompletionOptions};
use crate::crawler::{CrawlError, CrawlExecutor, CrawlOutput, UsageMetrics};
use crate::job::ExtractionJob;
use async_trait::async_trait;
use reqwest::Client;

/// Executes a job against the real page and the provider's API
///
/// Chunk requests are sent one after another; any failing request fails
/// the whole execution.
pub struct LlmCrawlExecutor {
    client: Client,
    chunk_token_threshold: usize,
    options: CompletionOptions,
}

impl LlmCrawlExecutor {
    /// Creates an executor from the executor configuration
    pub fn new(config: &ExecutorConfig) -> Result<Self, CrawlError> {
        Ok(Self {
            client: build_http_client(config)?,
            chunk_token_threshold: config.chunk_token_threshold,
            options: CompletionOptions {
                temperature: config.temperature,
                max_tokens: config.max_tokens,
            },
        })
    }
}

#[async_trait]
impl CrawlExecutor for LlmCrawlExecutor {
    async fn execute(&self, job: &ExtractionJob) -> Result<CrawlOutput, CrawlError> {
        let page = fetch_page(&self.client, job.url()).await?;

        let markdown = html_to_markdown(&page.body);
        if markdown.is_empty() {
            return Err(CrawlError::EmptyPage {
                url: page.final_url,
            });
        }

        let chunks = chunk_text(&markdown, self.chunk_token_threshold);
        tracing::info!(
            "Page {} converted to ~{} tokens in {} chunk(s)",
            page.final_url,
            estimate_tokens(&markdown),
            chunks.len()
        );

        let system = system_prompt(job.schema());
        let mut candidates = Vec::new();
        let mut usage = UsageMetrics::new();

        for (index, chunk) in chunks.iter().enumerate() {
            tracing::debug!(
                "Sending chunk {}/{} to {} ({})",
                index + 1,
                chunks.len(),
                job.provider().provider(),
                job.provider().model()
            );

            let (chunk_candidates, chunk_usage) = request_extraction(
                &self.client,
                job.provider(),
                self.options,
                &system,
                user_prompt(job.instruction(), &page.final_url, chunk),
            )
            .await?;

            tracing::debug!(
                "Chunk {} returned {} candidate(s), {} tokens",
                index + 1,
                chunk_candidates.len(),
                chunk_usage.total_tokens
            );

            candidates.extend(chunk_candidates);
            usage.record(chunk_usage);
        }

        Ok(CrawlOutput { candidates, usage })
    }

    fn name(&self) -> &str {
        "llm"
    }
}
