//! Test double returning preset candidates without any network access

use crate::crawler::{CrawlError, CrawlExecutor, CrawlOutput, UsageMetrics};
use crate::job::ExtractionJob;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Executor that answers every job with the same candidates
///
/// It can be told to fail a number of times first, to fail forever, or to
/// sleep before answering, which is enough to exercise retry and timeout
/// handling.
pub struct FixedExecutor {
    candidates: Vec<Value>,
    usage: UsageMetrics,
    failures: usize,
    failure_message: String,
    failure_status: u16,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FixedExecutor {
    pub fn new(candidates: Vec<Value>, usage: UsageMetrics) -> Self {
        Self {
            candidates,
            usage,
            failures: 0,
            failure_message: "provider unavailable".to_string(),
            failure_status: 503,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// An executor whose every call fails
    pub fn failing(message: impl Into<String>) -> Self {
        let mut executor = Self::new(Vec::new(), UsageMetrics::new());
        executor.failures = usize::MAX;
        executor.failure_message = message.into();
        executor
    }

    /// Fails the first `times` calls, then succeeds
    pub fn fail_times(mut self, times: usize) -> Self {
        self.failures = times;
        self
    }

    /// HTTP status reported by injected failures (503 by default)
    pub fn with_failure_status(mut self, status: u16) -> Self {
        self.failure_status = status;
        self
    }

    /// Sleeps before each answer
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of times `execute` was called
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CrawlExecutor for FixedExecutor {
    async fn execute(&self, _job: &ExtractionJob) -> Result<CrawlOutput, CrawlError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if call < self.failures {
            return Err(CrawlError::Provider {
                status: self.failure_status,
                message: self.failure_message.clone(),
            });
        }

        Ok(CrawlOutput {
            candidates: self.candidates.clone(),
            usage: self.usage.clone(),
        })
    }

    fn name(&self) -> &str {
        "fixed"
    }
}
