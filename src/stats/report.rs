//! Observed vs target distribution report

use crate::distribution::bucket::BucketSet;
use crate::stats::WorkerStats;
use serde::{Deserialize, Serialize};

/// Observed vs target share for one bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketReport {
    pub row: usize,
    pub min: f64,
    pub max: f64,
    pub ratio: f64,
    /// `ratio / sum(ratios)`, from the set's normalised weights
    pub expected_share: f64,
    pub observed_count: u64,
    pub observed_share: f64,
    /// `observed_share - expected_share`
    pub deviation: f64,
}

/// Distribution audit over a set of statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionReport {
    pub total: u64,
    pub unclassified: u64,
    pub buckets: Vec<BucketReport>,
}

impl DistributionReport {
    /// Compare `stats` against the target ratios of `set`
    pub fn new(set: &BucketSet, stats: &WorkerStats) -> Self {
        let buckets = set
            .iter()
            .enumerate()
            .map(|(index, bucket)| {
                let expected_share = set.target_share(index).unwrap_or(0.0);
                let observed_share = stats.share(bucket.row());
                BucketReport {
                    row: bucket.row(),
                    min: bucket.min(),
                    max: bucket.max(),
                    ratio: bucket.ratio(),
                    expected_share,
                    observed_count: stats.hits(bucket.row()),
                    observed_share,
                    deviation: observed_share - expected_share,
                }
            })
            .collect();

        Self {
            total: stats.iterations(),
            unclassified: stats.unclassified(),
            buckets,
        }
    }

    /// Largest absolute deviation from target over all buckets
    pub fn max_abs_deviation(&self) -> f64 {
        self.buckets
            .iter()
            .map(|b| b.deviation.abs())
            .fold(0.0, f64::max)
    }
}
