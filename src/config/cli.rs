//! CLI argument parsing using clap

use clap::Parser;
use std::path::PathBuf;

/// ratiogen - ratio-controlled random value generator
///
/// Draws values from configured ranges so that each range receives its target
/// share of draws, then reports observed vs target shares.
#[derive(Parser, Debug)]
#[command(name = "ratiogen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    // === Generator Options ===
    /// Bucket as MIN:MAX:RATIO (repeatable, replaces buckets from the config file)
    #[arg(short = 'b', long = "bucket", value_name = "MIN:MAX:RATIO", allow_hyphen_values = true)]
    pub buckets: Vec<String>,

    /// Variable name the formatted value is bound under
    #[arg(short = 'n', long)]
    pub variable_name: Option<String>,

    /// printf-style output format (e.g. %.2f, %d, %e)
    #[arg(short = 'f', long, allow_hyphen_values = true)]
    pub format: Option<String>,

    // === Worker Options ===
    /// Number of worker threads (0 = one per CPU)
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Iterations per worker
    #[arg(short = 'i', long, conflicts_with = "duration")]
    pub iterations: Option<u64>,

    /// Run duration per worker (e.g. 30s, 5m, 1h)
    #[arg(short = 'd', long)]
    pub duration: Option<String>,

    /// Master seed for reproducible runs
    #[arg(long, env = "RATIOGEN_SEED")]
    pub seed: Option<u64>,

    /// Log every Nth bound value at debug level
    #[arg(long)]
    pub sample_every: Option<u64>,

    // === Output Options ===
    /// Write a JSON report to this path
    #[arg(long, value_name = "PATH")]
    pub json_output: Option<PathBuf>,

    /// Write compact JSON instead of pretty-printed
    #[arg(long)]
    pub json_compact: bool,

    /// Show the per-worker breakdown
    #[arg(long)]
    pub per_worker: bool,

    /// Validate and print the configuration without running
    #[arg(long)]
    pub dry_run: bool,

    /// Log level when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate CLI arguments
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.config.is_none() && self.variable_name.is_none() {
            anyhow::bail!("--variable-name is required when no --config file is given");
        }

        if self.config.is_none() && self.buckets.is_empty() {
            anyhow::bail!("at least one --bucket is required when no --config file is given");
        }

        if self.iterations == Some(0) {
            anyhow::bail!("iterations must be at least 1");
        }

        if self.sample_every == Some(0) {
            anyhow::bail!("sample_every must be at least 1");
        }

        Ok(())
    }
}
