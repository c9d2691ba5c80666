//! Configuration validation
//!
//! Runs before any worker starts so a broken configuration fails once, up front,
//! instead of once per worker.

use super::*;
use crate::distribution::bucket::BucketSet;
use crate::util::format::OutputFormat;
use anyhow::{Context, Result};

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_generator(&config.generator)?;
    validate_workers(&config.workers)?;

    Ok(())
}

/// Validate generator configuration
pub fn validate_generator(generator: &GeneratorConfig) -> Result<()> {
    if generator.variable_name.trim().is_empty() {
        anyhow::bail!("variable_name must not be empty");
    }

    if generator.buckets.is_empty() {
        anyhow::bail!("At least one bucket must be configured");
    }

    OutputFormat::parse(&generator.output_format).context("Invalid output_format")?;

    // Same construction every worker performs at context start
    BucketSet::from_rows(&generator.buckets).context("Invalid bucket configuration")?;

    Ok(())
}

/// Validate worker configuration
pub fn validate_workers(workers: &WorkerConfig) -> Result<()> {
    if workers.threads == 0 {
        anyhow::bail!("threads must be at least 1");
    }

    match workers.completion_mode {
        CompletionMode::Iterations { count } if count == 0 => {
            anyhow::bail!("completion_mode iterations count must be at least 1");
        }
        CompletionMode::Duration { seconds } if seconds == 0 => {
            anyhow::bail!("completion_mode duration must be at least 1 second");
        }
        _ => {}
    }

    if workers.sample_every == Some(0) {
        anyhow::bail!("sample_every must be at least 1");
    }

    Ok(())
}
