//! JSON output formatting
//!
//! This module provides JSON serialization of a run with:
//! - Run information (host, timestamps, configuration summary)
//! - Aggregate observed vs target shares
//! - Per-worker detail (optional)

use crate::config::Config;
use crate::distribution::bucket::BucketSet;
use crate::stats::aggregator::StatisticsAggregator;
use crate::stats::report::DistributionReport;
use crate::stats::WorkerStats;
use crate::util::time::{calculate_rate, format_duration};
use crate::Result;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use std::time::Duration;

/// Duration with both microseconds and human-readable format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonDuration {
    pub micros: u64,
    pub human: String,
}

impl JsonDuration {
    pub fn from_duration(d: Duration) -> Self {
        Self {
            micros: d.as_micros() as u64,
            human: format_duration(d),
        }
    }
}

/// Bucket row as configured
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonBucket {
    pub min: String,
    pub max: String,
    pub ratio: String,
}

/// Configuration summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRunConfig {
    pub variable_name: String,
    pub output_format: String,
    pub threads: usize,
    pub completion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub buckets: Vec<JsonBucket>,
}

/// Run information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRunInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub duration: JsonDuration,
    pub draws_per_sec: f64,
    pub config: JsonRunConfig,
}

/// Value statistics for a set of draws
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonValues {
    pub min: Option<f64>,
    pub mean: Option<f64>,
    pub max: Option<f64>,
}

impl JsonValues {
    fn from_stats(stats: &WorkerStats) -> Self {
        Self {
            min: stats.min_value(),
            mean: stats.mean_value(),
            max: stats.max_value(),
        }
    }
}

/// Statistics for one worker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonWorkerReport {
    pub worker_id: usize,
    pub distribution: DistributionReport,
    pub values: JsonValues,
}

/// Complete JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRunOutput {
    pub run_info: JsonRunInfo,
    pub aggregate: DistributionReport,
    pub values: JsonValues,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub per_worker: Vec<JsonWorkerReport>,
}

/// Build the configuration summary
pub fn build_run_config(config: &Config) -> JsonRunConfig {
    JsonRunConfig {
        variable_name: config.generator.variable_name.clone(),
        output_format: config.generator.output_format.clone(),
        threads: config.workers.threads,
        completion: config.workers.completion_mode.to_string(),
        seed: config.workers.seed,
        buckets: config
            .generator
            .buckets
            .iter()
            .map(|row| JsonBucket {
                min: row.min.clone(),
                max: row.max.clone(),
                ratio: row.ratio.clone(),
            })
            .collect(),
    }
}

/// Build the JSON output for a finished run
///
/// Per-worker detail is included when `config.output.show_per_worker` is set.
pub fn build_run_output(
    set: &BucketSet,
    aggregator: &mut StatisticsAggregator,
    start_time: DateTime<Utc>,
    duration: Duration,
    config: &Config,
) -> Result<JsonRunOutput> {
    let aggregate = aggregator.aggregate()?.clone();

    let per_worker = if config.output.show_per_worker {
        aggregator
            .worker_ids()
            .into_iter()
            .filter_map(|id| {
                aggregator.worker_stats(id).map(|stats| JsonWorkerReport {
                    worker_id: id,
                    distribution: DistributionReport::new(set, stats),
                    values: JsonValues::from_stats(stats),
                })
            })
            .collect()
    } else {
        Vec::new()
    };

    let end_time = start_time
        + chrono::Duration::from_std(duration).context("Run duration out of range")?;

    Ok(JsonRunOutput {
        run_info: JsonRunInfo {
            hostname: get_hostname(),
            start_time: start_time.to_rfc3339(),
            end_time: end_time.to_rfc3339(),
            duration: JsonDuration::from_duration(duration),
            draws_per_sec: calculate_rate(aggregate.iterations(), duration),
            config: build_run_config(config),
        },
        aggregate: DistributionReport::new(set, &aggregate),
        values: JsonValues::from_stats(&aggregate),
        per_worker,
    })
}

/// Write JSON output to file
pub fn write_json_output(output_path: &Path, output: &JsonRunOutput, pretty: bool) -> Result<()> {
    let file = File::create(output_path)
        .with_context(|| format!("Failed to create JSON output {}", output_path.display()))?;

    if pretty {
        serde_json::to_writer_pretty(file, output)?;
    } else {
        serde_json::to_writer(file, output)?;
    }

    Ok(())
}

fn get_hostname() -> Option<String> {
    hostname::get().ok().and_then(|h| h.into_string().ok())
}
