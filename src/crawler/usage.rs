//! Token usage accounting for extraction requests

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tokens consumed by one chat-completions request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Usage accumulated over every request of one extraction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMetrics {
    pub requests: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    /// Breakdown in request order
    pub per_request: Vec<TokenUsage>,
}

impl UsageMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one request's usage to the totals
    pub fn record(&mut self, usage: TokenUsage) {
        self.requests += 1;
        self.prompt_tokens += usage.prompt_tokens;
        self.completion_tokens += usage.completion_tokens;
        self.total_tokens += usage.total_tokens;
        self.per_request.push(usage);
    }
}

impl fmt::Display for UsageMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Requests: {}", self.requests)?;
        writeln!(f, "  Prompt tokens: {}", self.prompt_tokens)?;
        writeln!(f, "  Completion tokens: {}", self.completion_tokens)?;
        write!(f, "  Total tokens: {}", self.total_tokens)?;

        if self.per_request.len() > 1 {
            write!(f, "\n  Per request:")?;
            for (i, usage) in self.per_request.iter().enumerate() {
                write!(
                    f,
                    "\n    #{}: prompt={} completion={} total={}",
                    i + 1,
                    usage.prompt_tokens,
                    usage.completion_tokens,
                    usage.total_tokens
                )?;
            }
        }

        Ok(())
    }
}
