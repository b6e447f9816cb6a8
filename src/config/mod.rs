//! Configuration module for Sumi-Extract
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and resolving the extraction provider from the environment.
//!
//! # Example
//!
//! ```no_run
//! use sumi_extract::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("extract.toml")).unwrap();
//! println!("Extracting from: {}", config.job.url);
//! ```

mod parser;
mod provider;
mod types;
mod validation;

// Re-export types
pub use provider::{Provider, ProviderConfig};
pub use types::{
    Config, ExecutorConfig, JobConfig, OutputConfig, ProviderSection, DEFAULT_INSTRUCTION,
    DEFAULT_OUTPUT_PATH, DEFAULT_URL,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
