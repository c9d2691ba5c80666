//! CLI to Config conversion utilities

use crate::config::cli::Cli;
use crate::config::toml::{merge_cli_with_config, parse_toml_file};
use crate::config::{Config, GeneratorConfig, OutputConfig, WorkerConfig};
use crate::distribution::bucket::BucketRow;
use anyhow::{Context, Result};

/// Parse a duration string (e.g., "60s", "5m", "1h") to seconds
pub fn parse_duration(s: &str) -> Result<u64> {
    let s = s.trim().to_lowercase();

    let (num_str, multiplier) = if s.ends_with("sec") || s.ends_with('s') {
        (s.trim_end_matches("sec").trim_end_matches('s'), 1u64)
    } else if s.ends_with("min") || s.ends_with('m') {
        (s.trim_end_matches("min").trim_end_matches('m'), 60)
    } else if s.ends_with("hr") || s.ends_with('h') {
        (s.trim_end_matches("hr").trim_end_matches('h'), 3600)
    } else {
        (s.as_str(), 1)
    };

    let num: u64 = num_str
        .parse()
        .with_context(|| format!("Invalid duration format: {}", s))?;

    Ok(num * multiplier)
}

/// Parse a `MIN:MAX:RATIO` bucket specification
///
/// Only splits the text; numeric parsing happens when a context builds its
/// bucket set so errors name the offending row and field.
pub fn parse_bucket_spec(spec: &str) -> Result<BucketRow> {
    let parts: Vec<&str> = spec.split(':').collect();
    match parts.as_slice() {
        [min, max, ratio] => Ok(BucketRow::new(min.trim(), max.trim(), ratio.trim())),
        _ => anyhow::bail!("Invalid bucket {:?}: expected MIN:MAX:RATIO", spec),
    }
}

/// Build the run configuration from the CLI, loading the config file if given
pub fn build_config(cli: &Cli) -> Result<Config> {
    let base = match cli.config {
        Some(ref path) => parse_toml_file(path)?,
        None => Config {
            generator: GeneratorConfig {
                variable_name: String::new(),
                output_format: "%.2f".to_string(),
                buckets: Vec::new(),
            },
            workers: WorkerConfig::default(),
            output: OutputConfig::default(),
        },
    };

    merge_cli_with_config(cli, base)
}
