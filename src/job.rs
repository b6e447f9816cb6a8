//! Extraction job construction
//!
//! An [`ExtractionJob`] bundles everything one crawl needs: the target page,
//! the record schema, the instruction for the model and the provider. It is
//! immutable once built.

use crate::config::ProviderConfig;
use crate::schema::Schema;
use crate::ExtractError;
use url::Url;

/// A ready-to-execute extraction request
#[derive(Debug, Clone)]
pub struct ExtractionJob {
    url: Url,
    schema: Schema,
    instruction: String,
    provider: ProviderConfig,
}

impl ExtractionJob {
    /// Builds a job after checking its inputs
    ///
    /// # Errors
    ///
    /// * `InvalidUrl` - `url` is not an absolute http(s) URL with a host
    /// * `InvalidInstruction` - `instruction` is empty or whitespace
    ///
    /// # Example
    ///
    /// ```
    /// use sumi_extract::config::ProviderConfig;
    /// use sumi_extract::job::ExtractionJob;
    /// use sumi_extract::schema::Schema;
    ///
    /// let provider = ProviderConfig::build_with("deepseek", |_| Some("key".to_string())).unwrap();
    /// let job = ExtractionJob::build(
    ///     "https://example.com/table",
    ///     Schema::leaderboard(),
    ///     "Extract every row",
    ///     provider,
    /// )
    /// .unwrap();
    /// assert_eq!(job.url().host_str(), Some("example.com"));
    /// ```
    pub fn build(
        url: &str,
        schema: Schema,
        instruction: &str,
        provider: ProviderConfig,
    ) -> Result<Self, ExtractError> {
        let url = parse_target_url(url)?;

        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(ExtractError::InvalidInstruction);
        }

        Ok(Self {
            url,
            schema,
            instruction: instruction.to_string(),
            provider,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn provider(&self) -> &ProviderConfig {
        &self.provider
    }
}

fn parse_target_url(raw: &str) -> Result<Url, ExtractError> {
    let invalid = |reason: String| ExtractError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }

    Ok(url)
}
