use crate::schema::Schema;
use serde::Deserialize;

/// Page scraped when no URL is configured
pub const DEFAULT_URL: &str = "https://web.lmarena.ai/leaderboard";

/// Instruction sent to the extraction model when none is configured
pub const DEFAULT_INSTRUCTION: &str = "Extrae todas las filas de la tabla principal como objetos con: \
'Rank', 'Model', 'arena score', '95% CI', 'votes', 'organization', 'License'. \
Ten en cuenta que el Model tiene que ser el nombre del modelo AI, por ejemplo: 'Claude 3.5 Sonnet (20241022)'.";

/// Output file written when no path is configured
pub const DEFAULT_OUTPUT_PATH: &str = "leaderboard_data.json";

/// Main configuration structure for Sumi-Extract
///
/// Every section is optional; an empty file yields the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub job: JobConfig,
    #[serde(default)]
    pub provider: ProviderSection,
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Replaces the built-in leaderboard schema when present
    #[serde(default)]
    pub schema: Option<Schema>,
}

impl Config {
    /// Returns the configured schema, or the leaderboard schema
    pub fn schema(&self) -> Schema {
        self.schema.clone().unwrap_or_else(Schema::leaderboard)
    }
}

/// What to extract and from where
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    /// Page to extract from
    #[serde(default = "default_url")]
    pub url: String,

    /// Natural-language instruction for the extraction model
    #[serde(default = "default_instruction")]
    pub instruction: String,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            instruction: default_instruction(),
        }
    }
}

/// Which extraction backend to use
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSection {
    /// Provider name: "deepseek" or "chatgpt"
    #[serde(default = "default_provider")]
    pub name: String,

    /// Overrides the provider's default model identifier
    #[serde(default)]
    pub model: Option<String>,

    /// Overrides the provider's default API base URL
    #[serde(rename = "base-url", default)]
    pub base_url: Option<String>,
}

impl Default for ProviderSection {
    fn default() -> Self {
        Self {
            name: default_provider(),
            model: None,
            base_url: None,
        }
    }
}

/// Crawl executor behavior
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutorConfig {
    /// Upper bound on one whole executor call (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after a failed executor call
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry, doubled on each further one (milliseconds)
    #[serde(rename = "retry-backoff-ms", default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Timeout of a single HTTP request (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Approximate token budget of one chunk sent to the model
    #[serde(rename = "chunk-token-threshold", default = "default_chunk_token_threshold")]
    pub chunk_token_threshold: usize,

    /// Sampling temperature
    #[serde(default)]
    pub temperature: f32,

    /// Completion token limit per request
    #[serde(rename = "max-tokens", default = "default_max_tokens")]
    pub max_tokens: u32,

    /// User agent sent when fetching the page
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            chunk_token_threshold: default_chunk_token_threshold(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            user_agent: default_user_agent(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the JSON file with the validated records
    #[serde(default = "default_output_path")]
    pub path: String,

    /// Number of records printed as a sample
    #[serde(rename = "sample-size", default = "default_sample_size")]
    pub sample_size: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            sample_size: default_sample_size(),
        }
    }
}

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

fn default_instruction() -> String {
    DEFAULT_INSTRUCTION.to_string()
}

fn default_provider() -> String {
    "chatgpt".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_chunk_token_threshold() -> usize {
    1000
}

fn default_max_tokens() -> u32 {
    800
}

fn default_user_agent() -> String {
    format!("sumi-extract/{}", env!("CARGO_PKG_VERSION"))
}

fn default_output_path() -> String {
    DEFAULT_OUTPUT_PATH.to_string()
}

fn default_sample_size() -> usize {
    5
}
