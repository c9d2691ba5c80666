//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.
//!
//! The bucket rows and output settings are read-only once workers start; every
//! worker builds its own bucket set from them.

pub mod cli;
pub mod cli_convert;
pub mod toml;
pub mod validator;
pub mod workload;

use crate::distribution::bucket::BucketRow;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use workload::CompletionMode;

/// Complete run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub workers: WorkerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Generator configuration: buckets and how drawn values are exported
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Name the formatted value is bound under on every iteration
    pub variable_name: String,
    /// printf-style format applied to the drawn value
    #[serde(default = "default_output_format")]
    pub output_format: String,
    /// Bucket rows in configuration order
    #[serde(default)]
    pub buckets: Vec<BucketRow>,
}

fn default_output_format() -> String {
    "%.2f".to_string()
}

/// Worker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Number of worker threads (execution contexts)
    #[serde(default = "default_threads")]
    pub threads: usize,
    /// When each worker stops
    #[serde(default)]
    pub completion_mode: CompletionMode,
    /// Master seed; each worker derives its own seed from it
    pub seed: Option<u64>,
    /// Log every Nth bound value at debug level
    pub sample_every: Option<u64>,
}

fn default_threads() -> usize {
    1
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            completion_mode: CompletionMode::default(),
            seed: None,
            sample_every: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Write a JSON report to this path
    pub json_output: Option<PathBuf>,
    /// Compact JSON instead of pretty-printed
    #[serde(default)]
    pub json_compact: bool,
    /// Print the per-worker breakdown in the text report
    #[serde(default)]
    pub show_per_worker: bool,
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Configuration:")?;
        writeln!(f, "  Generator: {}", self.generator)?;
        writeln!(f, "  Workers: {}", self.workers)?;
        writeln!(f, "  Output: {}", self.output)?;
        Ok(())
    }
}

impl fmt::Display for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "variable={}, format={:?}, buckets=[{}]",
            self.variable_name,
            self.output_format,
            self.buckets
                .iter()
                .map(|b| format!("[{}, {}] x {}", b.min, b.max, b.ratio))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl fmt::Display for WorkerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "threads={}, completion={}", self.threads, self.completion_mode)?;
        if let Some(seed) = self.seed {
            write!(f, ", seed={}", seed)?;
        }
        Ok(())
    }
}

impl fmt::Display for OutputConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.json_output {
            Some(ref path) => write!(f, "json={}", path.display())?,
            None => write!(f, "text only")?,
        }
        if self.show_per_worker {
            write!(f, ", per-worker")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_config_default() {
        let workers = WorkerConfig::default();
        assert_eq!(workers.threads, 1);
        assert_eq!(workers.completion_mode, CompletionMode::Iterations { count: 1000 });
        assert!(workers.seed.is_none());
    }

    #[test]
    fn test_config_display() {
        let config = Config {
            generator: GeneratorConfig {
                variable_name: "price".to_string(),
                output_format: "%.2f".to_string(),
                buckets: vec![BucketRow::new("1", "10", "0.1")],
            },
            workers: WorkerConfig {
                seed: Some(7),
                ..Default::default()
            },
            output: OutputConfig::default(),
        };

        let text = config.to_string();
        assert!(text.contains("variable=price"));
        assert!(text.contains("[1, 10] x 0.1"));
        assert!(text.contains("seed=7"));
        assert!(text.contains("text only"));
    }
}
