//! Linear extraction pipeline
//!
//! configuration → provider → job → bounded execution → validate/report.
//! Configuration and input errors surface before any network call or file
//! write.

use crate::config::{Config, ExecutorConfig, ProviderConfig};
use crate::crawler::{CrawlError, CrawlExecutor, CrawlOutput};
use crate::job::ExtractionJob;
use crate::output::{process, ResultSet};
use crate::ExtractError;
use std::path::Path;
use std::time::Duration;

/// Timeout and retry bounds around one executor call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Limit for each attempt
    pub timeout: Duration,
    /// Attempts after the first one
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each further retry
    pub backoff: Duration,
}

impl From<&ExecutorConfig> for RetryPolicy {
    fn from(config: &ExecutorConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.backoff
            .checked_mul(1u32 << (retry.saturating_sub(1)).min(16))
            .unwrap_or(Duration::MAX)
    }
}

/// Resolves the provider from the environment and builds the job
///
/// Fails fast on unsupported providers, missing credentials, invalid URLs
/// and empty instructions.
pub fn build_job<F>(config: &Config, lookup: F) -> Result<ExtractionJob, ExtractError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut provider = ProviderConfig::build_with(&config.provider.name, lookup)?;
    if let Some(model) = &config.provider.model {
        provider = provider.with_model(model.clone());
    }
    if let Some(base_url) = &config.provider.base_url {
        provider = provider.with_base_url(base_url.clone());
    }

    ExtractionJob::build(
        &config.job.url,
        config.schema(),
        &config.job.instruction,
        provider,
    )
}

/// Runs the executor under a timeout, retrying failures with backoff
///
/// A timed-out attempt counts as a failure like any other. Failures that
/// cannot change on a new attempt (see [`CrawlError::is_transient`]) are
/// returned at once.
pub async fn execute_with_retry(
    executor: &dyn CrawlExecutor,
    job: &ExtractionJob,
    policy: &RetryPolicy,
) -> Result<CrawlOutput, CrawlError> {
    let mut attempt = 0;

    loop {
        let result = match tokio::time::timeout(policy.timeout, executor.execute(job)).await {
            Ok(result) => result,
            Err(_) => Err(CrawlError::Timeout {
                context: format!(
                    "{} executor on {} after {:?}",
                    executor.name(),
                    job.url(),
                    policy.timeout
                ),
            }),
        };

        match result {
            Ok(output) => return Ok(output),
            Err(e) if attempt < policy.max_retries && e.is_transient() => {
                attempt += 1;
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    "Attempt {} failed: {}; retrying in {:?} ({}/{})",
                    attempt,
                    e,
                    delay,
                    attempt,
                    policy.max_retries
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                if !e.is_transient() {
                    tracing::debug!("Not retrying: failure is permanent");
                }
                tracing::error!("Extraction failed after {} attempt(s): {}", attempt + 1, e);
                return Err(e);
            }
        }
    }
}

/// Executes a built job and processes its candidates
pub async fn run(
    job: &ExtractionJob,
    executor: &dyn CrawlExecutor,
    policy: &RetryPolicy,
    output_path: &Path,
    sample_size: usize,
) -> Result<ResultSet, ExtractError> {
    tracing::info!(
        "Extracting '{}' records from {} with {} ({})",
        job.schema().title,
        job.url(),
        job.provider().provider(),
        job.provider().model()
    );

    let output = execute_with_retry(executor, job, policy).await?;
    tracing::info!(
        "Executor returned {} candidate(s) using {} token(s)",
        output.candidates.len(),
        output.usage.total_tokens
    );

    process(
        job.schema(),
        &output.candidates,
        &output.usage,
        output_path,
        sample_size,
    )
}
