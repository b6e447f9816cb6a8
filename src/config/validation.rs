use crate::config::types::{Config, ExecutorConfig, OutputConfig, ProviderSection};
use crate::schema::Schema;
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
///
/// The job URL and instruction are checked later, when the job is built,
/// because command-line flags may still override them.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_provider_section(&config.provider)?;
    validate_executor_config(&config.executor)?;
    validate_output_config(&config.output)?;
    if let Some(schema) = &config.schema {
        validate_schema(schema)?;
    }
    Ok(())
}

/// Validates provider overrides
fn validate_provider_section(config: &ProviderSection) -> Result<(), ConfigError> {
    if config.name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "provider name cannot be empty".to_string(),
        ));
    }

    if let Some(model) = &config.model {
        if model.trim().is_empty() {
            return Err(ConfigError::Validation(
                "provider model cannot be empty when set".to_string(),
            ));
        }
    }

    if let Some(base_url) = &config.base_url {
        let url = Url::parse(base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url '{}': {}", base_url, e)))?;

        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(ConfigError::Validation(format!(
                "base-url '{}' must use http or https",
                base_url
            )));
        }
    }

    Ok(())
}

/// Validates executor configuration
fn validate_executor_config(config: &ExecutorConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max-retries must be between 0 and 10, got {}",
            config.max_retries
        )));
    }

    if config.chunk_token_threshold < 50 {
        return Err(ConfigError::Validation(format!(
            "chunk-token-threshold must be >= 50, got {}",
            config.chunk_token_threshold
        )));
    }

    if !(0.0..=2.0).contains(&config.temperature) {
        return Err(ConfigError::Validation(format!(
            "temperature must be between 0.0 and 2.0, got {}",
            config.temperature
        )));
    }

    if config.max_tokens < 1 {
        return Err(ConfigError::Validation(
            "max-tokens must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates a user-declared schema
pub(crate) fn validate_schema(schema: &Schema) -> Result<(), ConfigError> {
    if schema.fields.is_empty() {
        return Err(ConfigError::Validation(format!(
            "schema '{}' must declare at least one field",
            schema.title
        )));
    }

    let mut seen = HashSet::new();
    for field in &schema.fields {
        if field.name.is_empty() {
            return Err(ConfigError::Validation(
                "schema field name cannot be empty".to_string(),
            ));
        }

        for key in std::iter::once(&field.name).chain(field.aliases.iter()) {
            if !seen.insert(key.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "schema key '{}' is declared more than once",
                    key
                )));
            }
        }
    }

    Ok(())
}
