//! Statistics collection
//!
//! Per-worker tallies of produced values, merged across workers for reporting.
//!
//! Tallies are taken by re-classifying the exported text of every draw, not from
//! the selector's internal counts. A report therefore shows what a downstream
//! consumer of the values would observe.
//!
//! # Example
//!
//! ```
//! use ratiogen::stats::WorkerStats;
//!
//! let mut stats = WorkerStats::new(3);
//! stats.record(Some(2), 88.5);
//! stats.record(Some(1), 41.0);
//! stats.record(None, 20.0);
//!
//! assert_eq!(stats.iterations(), 3);
//! assert_eq!(stats.hits(2), 1);
//! assert_eq!(stats.unclassified(), 1);
//! ```

pub mod aggregator;
pub mod report;

use crate::Result;
use serde::{Deserialize, Serialize};

/// Statistics for a single worker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkerStats {
    iterations: u64,
    bucket_hits: Vec<u64>,
    unclassified: u64,
    min_value: Option<f64>,
    max_value: Option<f64>,
    value_sum: f64,
}

impl WorkerStats {
    /// Create empty statistics for `num_buckets` configuration rows
    pub fn new(num_buckets: usize) -> Self {
        Self {
            bucket_hits: vec![0; num_buckets],
            ..Default::default()
        }
    }

    /// Record one produced value and the row it was classified into
    #[inline]
    pub fn record(&mut self, row: Option<usize>, value: f64) {
        self.iterations += 1;
        match row.and_then(|r| self.bucket_hits.get_mut(r)) {
            Some(hits) => *hits += 1,
            None => self.unclassified += 1,
        }
        self.min_value = Some(self.min_value.map_or(value, |m| m.min(value)));
        self.max_value = Some(self.max_value.map_or(value, |m| m.max(value)));
        self.value_sum += value;
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Hits per configuration row
    pub fn bucket_hits(&self) -> &[u64] {
        &self.bucket_hits
    }

    pub fn hits(&self, row: usize) -> u64 {
        self.bucket_hits.get(row).copied().unwrap_or(0)
    }

    pub fn unclassified(&self) -> u64 {
        self.unclassified
    }

    pub fn min_value(&self) -> Option<f64> {
        self.min_value
    }

    pub fn max_value(&self) -> Option<f64> {
        self.max_value
    }

    pub fn mean_value(&self) -> Option<f64> {
        if self.iterations == 0 {
            None
        } else {
            Some(self.value_sum / self.iterations as f64)
        }
    }

    /// Observed share of `row` among all recorded iterations
    pub fn share(&self, row: usize) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            self.hits(row) as f64 / self.iterations as f64
        }
    }

    /// Merge another worker's statistics into this one
    ///
    /// Empty statistics adopt the other side's bucket layout. Otherwise both sides
    /// must track the same number of rows.
    pub fn merge(&mut self, other: &WorkerStats) -> Result<()> {
        if self.bucket_hits.len() != other.bucket_hits.len() {
            if self.iterations == 0 {
                self.bucket_hits = vec![0; other.bucket_hits.len()];
            } else {
                anyhow::bail!(
                    "Cannot merge statistics for {} buckets into statistics for {} buckets",
                    other.bucket_hits.len(),
                    self.bucket_hits.len()
                );
            }
        }

        self.iterations += other.iterations;
        for (mine, theirs) in self.bucket_hits.iter_mut().zip(&other.bucket_hits) {
            *mine += theirs;
        }
        self.unclassified += other.unclassified;
        self.min_value = match (self.min_value, other.min_value) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.max_value = match (self.max_value, other.max_value) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        self.value_sum += other.value_sum;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stats_empty() {
        let stats = WorkerStats::new(3);
        assert_eq!(stats.iterations(), 0);
        assert_eq!(stats.bucket_hits(), &[0, 0, 0]);
        assert_eq!(stats.mean_value(), None);
        assert_eq!(stats.share(0), 0.0);
    }

    #[test]
    fn test_record() {
        let mut stats = WorkerStats::new(2);
        stats.record(Some(0), 2.0);
        stats.record(Some(1), 6.0);
        stats.record(Some(1), 7.0);
        stats.record(Some(5), 1.0);

        assert_eq!(stats.iterations(), 4);
        assert_eq!(stats.bucket_hits(), &[1, 2]);
        assert_eq!(stats.unclassified(), 1);
        assert_eq!(stats.min_value(), Some(1.0));
        assert_eq!(stats.max_value(), Some(7.0));
        assert_eq!(stats.mean_value(), Some(4.0));
        assert_eq!(stats.share(1), 0.5);
    }

    #[test]
    fn test_merge() {
        let mut a = WorkerStats::new(2);
        a.record(Some(0), 1.0);

        let mut b = WorkerStats::new(2);
        b.record(Some(1), 9.0);
        b.record(None, 5.0);

        a.merge(&b).unwrap();
        assert_eq!(a.iterations(), 3);
        assert_eq!(a.bucket_hits(), &[1, 1]);
        assert_eq!(a.unclassified(), 1);
        assert_eq!(a.min_value(), Some(1.0));
        assert_eq!(a.max_value(), Some(9.0));
    }

    #[test]
    fn test_merge_into_empty_adopts_layout() {
        let mut total = WorkerStats::default();
        let mut worker = WorkerStats::new(3);
        worker.record(Some(2), 80.0);

        total.merge(&worker).unwrap();
        assert_eq!(total.bucket_hits(), &[0, 0, 1]);
    }

    #[test]
    fn test_merge_mismatched_layout_fails() {
        let mut a = WorkerStats::new(2);
        a.record(Some(0), 1.0);
        let b = WorkerStats::new(3);

        assert!(a.merge(&b).is_err());
    }
}
