//! TOML configuration file parsing

use super::*;
use crate::config::cli::Cli;
use crate::config::cli_convert::{parse_bucket_spec, parse_duration};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<Config> {
    let config: Config = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Merge CLI arguments with TOML configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: Config) -> Result<Config> {
    // Override generator settings
    if !cli.buckets.is_empty() {
        config.generator.buckets = cli
            .buckets
            .iter()
            .map(|spec| parse_bucket_spec(spec))
            .collect::<Result<Vec<_>>>()?;
    }
    if let Some(ref name) = cli.variable_name {
        config.generator.variable_name = name.clone();
    }
    if let Some(ref format) = cli.format {
        config.generator.output_format = format.clone();
    }

    // Override worker settings
    if let Some(threads) = cli.threads {
        config.workers.threads = if threads == 0 { num_cpus::get() } else { threads };
    }
    if let Some(count) = cli.iterations {
        config.workers.completion_mode = CompletionMode::Iterations { count };
    } else if let Some(ref duration_str) = cli.duration {
        let seconds = parse_duration(duration_str).context("Invalid duration")?;
        config.workers.completion_mode = CompletionMode::Duration { seconds };
    }
    if cli.seed.is_some() {
        config.workers.seed = cli.seed;
    }
    if cli.sample_every.is_some() {
        config.workers.sample_every = cli.sample_every;
    }

    // Override output settings
    if let Some(ref path) = cli.json_output {
        config.output.json_output = Some(path.clone());
    }
    if cli.json_compact {
        config.output.json_compact = true;
    }
    if cli.per_worker {
        config.output.show_per_worker = true;
    }

    Ok(config)
}
