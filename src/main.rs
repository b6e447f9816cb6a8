//! Sumi-Extract main entry point
//!
//! This is the command-line interface for the Sumi-Extract table extractor.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use sumi_extract::config::{load_config_with_hash, validate, Config};
use sumi_extract::crawler::LlmCrawlExecutor;
use sumi_extract::job::ExtractionJob;
use sumi_extract::pipeline::{self, RetryPolicy};
use tracing_subscriber::EnvFilter;

/// Sumi-Extract: schema-driven table extraction with an LLM
///
/// Fetches one web page, asks DeepSeek or ChatGPT to extract the rows of a
/// table, validates every record against the schema and writes the valid
/// ones to a JSON file.
#[derive(Parser, Debug)]
#[command(name = "sumi-extract")]
#[command(version)]
#[command(about = "Schema-driven table extraction with an LLM", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Extraction provider: deepseek or chatgpt
    #[arg(short, long)]
    provider: Option<String>,

    /// Model identifier, overriding the provider default
    #[arg(short, long)]
    model: Option<String>,

    /// Page to extract from
    #[arg(long)]
    url: Option<String>,

    /// Instruction for the extraction model
    #[arg(long)]
    instruction: Option<String>,

    /// JSON file to write
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of records printed as a sample
    #[arg(long)]
    sample: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate inputs and show the job without contacting any server
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load_configuration(&cli)?;

    // Provider credentials and job inputs are checked before any network call
    let job = pipeline::build_job(&config, |var| std::env::var(var).ok())?;

    if cli.dry_run {
        handle_dry_run(&config, &job);
        return Ok(());
    }

    handle_extract(&config, &job).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG` takes precedence when set.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if quiet {
            EnvFilter::new("error")
        } else {
            match verbose {
                0 => EnvFilter::new("sumi_extract=info,warn"),
                1 => EnvFilter::new("sumi_extract=debug,info"),
                2 => EnvFilter::new("sumi_extract=trace,debug"),
                _ => EnvFilter::new("trace"),
            }
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the configuration file (if any) and applies command-line overrides
fn load_configuration(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(provider) = &cli.provider {
        config.provider.name = provider.clone();
    }
    if let Some(model) = &cli.model {
        config.provider.model = Some(model.clone());
    }
    if let Some(url) = &cli.url {
        config.job.url = url.clone();
    }
    if let Some(instruction) = &cli.instruction {
        config.job.instruction = instruction.clone();
    }
    if let Some(output) = &cli.output {
        config.output.path = output.display().to_string();
    }
    if let Some(sample) = cli.sample {
        config.output.sample_size = sample;
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows what would be extracted
fn handle_dry_run(config: &Config, job: &ExtractionJob) {
    println!("=== Sumi-Extract Dry Run ===\n");

    println!("Job:");
    println!("  URL: {}", job.url());
    println!("  Instruction: {}", job.instruction());

    println!("\nProvider:");
    println!("  Name: {}", job.provider().provider());
    println!("  Model: {}", job.provider().model());
    println!("  Endpoint: {}", job.provider().chat_completions_url());
    println!("  API key: <set via {}>", job.provider().provider().api_key_var());

    println!("\nExecutor:");
    println!("  Timeout: {}s", config.executor.timeout_secs);
    println!("  Max retries: {}", config.executor.max_retries);
    println!(
        "  Chunk token threshold: {}",
        config.executor.chunk_token_threshold
    );
    println!("  Temperature: {}", config.executor.temperature);
    println!("  Max tokens: {}", config.executor.max_tokens);

    println!("\nSchema '{}' ({} fields):", job.schema().title, job.schema().fields.len());
    for field in &job.schema().fields {
        let required = if field.required { "required" } else { "optional" };
        println!("  - {} ({}, {})", field.name, field.field_type, required);
    }

    println!("\nOutput:");
    println!("  Path: {}", config.output.path);
    println!("  Sample size: {}", config.output.sample_size);

    println!("\n✓ Configuration is valid");
}

/// Handles the main extraction
async fn handle_extract(config: &Config, job: &ExtractionJob) -> anyhow::Result<()> {
    let executor =
        LlmCrawlExecutor::new(&config.executor).context("failed to create crawl executor")?;
    let policy = RetryPolicy::from(&config.executor);

    let result_set = pipeline::run(
        job,
        &executor,
        &policy,
        Path::new(&config.output.path),
        config.output.sample_size,
    )
    .await?;

    tracing::info!(
        "Extraction completed: {} record(s), {} rejected",
        result_set.len(),
        result_set.rejected_count()
    );
    Ok(())
}
