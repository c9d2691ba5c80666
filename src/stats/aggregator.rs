//! Statistics aggregation
//!
//! Merges per-worker statistics into a single aggregate view while preserving the
//! per-worker detail.
//!
//! Selection counters are never shared between workers; only the tallies of
//! produced values are combined here, after the workers have finished. Each
//! worker converges to the target ratios on its own, so the aggregate does too.
//!
//! # Example
//!
//! ```
//! use ratiogen::stats::{WorkerStats, aggregator::StatisticsAggregator};
//!
//! let mut worker1 = WorkerStats::new(2);
//! worker1.record(Some(0), 3.0);
//!
//! let mut worker2 = WorkerStats::new(2);
//! worker2.record(Some(1), 50.0);
//!
//! let mut aggregator = StatisticsAggregator::new();
//! aggregator.add_worker(0, worker1);
//! aggregator.add_worker(1, worker2);
//!
//! let aggregate = aggregator.aggregate()?;
//! assert_eq!(aggregate.iterations(), 2);
//! assert_eq!(aggregate.bucket_hits(), &[1, 1]);
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::stats::WorkerStats;
use crate::Result;
use std::collections::HashMap;

/// Statistics aggregator for multiple workers
#[derive(Debug, Default)]
pub struct StatisticsAggregator {
    /// Per-worker statistics (worker_id → stats)
    workers: HashMap<usize, WorkerStats>,

    /// Cached aggregate, invalidated when a worker is added
    aggregate_cache: Option<WorkerStats>,
}

impl StatisticsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add statistics from a worker, replacing any earlier entry for that id
    pub fn add_worker(&mut self, worker_id: usize, stats: WorkerStats) {
        self.workers.insert(worker_id, stats);
        self.aggregate_cache = None;
    }

    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    /// Aggregate statistics across all workers
    ///
    /// Workers are merged in id order so the result is the same on every call.
    /// Fails if workers tracked different numbers of buckets.
    pub fn aggregate(&mut self) -> Result<&WorkerStats> {
        if self.aggregate_cache.is_none() {
            let mut aggregate = WorkerStats::default();
            for id in self.worker_ids() {
                aggregate.merge(&self.workers[&id])?;
            }
            self.aggregate_cache = Some(aggregate);
        }

        match self.aggregate_cache {
            Some(ref aggregate) => Ok(aggregate),
            None => anyhow::bail!("aggregate statistics unavailable"),
        }
    }

    /// Statistics for a specific worker
    pub fn worker_stats(&self, worker_id: usize) -> Option<&WorkerStats> {
        self.workers.get(&worker_id)
    }

    /// Worker IDs in ascending order
    pub fn worker_ids(&self) -> Vec<usize> {
        let mut ids: Vec<usize> = self.workers.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats_with(hits: &[(usize, f64)]) -> WorkerStats {
        let mut stats = WorkerStats::new(3);
        for &(row, value) in hits {
            stats.record(Some(row), value);
        }
        stats
    }

    #[test]
    fn test_aggregator_new() {
        let aggregator = StatisticsAggregator::new();
        assert_eq!(aggregator.num_workers(), 0);
    }

    #[test]
    fn test_aggregate_empty() {
        let mut aggregator = StatisticsAggregator::new();
        let aggregate = aggregator.aggregate().unwrap();
        assert_eq!(aggregate.iterations(), 0);
    }

    #[test]
    fn test_aggregate_multiple_workers() {
        let mut aggregator = StatisticsAggregator::new();
        aggregator.add_worker(0, stats_with(&[(0, 5.0), (2, 90.0)]));
        aggregator.add_worker(1, stats_with(&[(2, 80.0)]));
        aggregator.add_worker(2, stats_with(&[(1, 50.0), (2, 75.0)]));

        let aggregate = aggregator.aggregate().unwrap();
        assert_eq!(aggregate.iterations(), 5);
        assert_eq!(aggregate.bucket_hits(), &[1, 1, 3]);
        assert_eq!(aggregate.min_value(), Some(5.0));
        assert_eq!(aggregate.max_value(), Some(90.0));
    }

    #[test]
    fn test_cache_invalidated_on_add() {
        let mut aggregator = StatisticsAggregator::new();
        aggregator.add_worker(0, stats_with(&[(0, 1.0)]));
        assert_eq!(aggregator.aggregate().unwrap().iterations(), 1);

        aggregator.add_worker(1, stats_with(&[(1, 45.0)]));
        assert_eq!(aggregator.aggregate().unwrap().iterations(), 2);
    }

    #[test]
    fn test_mismatched_workers_fail() {
        let mut aggregator = StatisticsAggregator::new();
        aggregator.add_worker(0, stats_with(&[(0, 1.0)]));
        let mut other = WorkerStats::new(1);
        other.record(Some(0), 1.0);
        aggregator.add_worker(1, other);

        assert!(aggregator.aggregate().is_err());
    }

    #[test]
    fn test_worker_ids_sorted() {
        let mut aggregator = StatisticsAggregator::new();
        aggregator.add_worker(2, WorkerStats::new(3));
        aggregator.add_worker(0, WorkerStats::new(3));
        aggregator.add_worker(1, WorkerStats::new(3));

        assert_eq!(aggregator.worker_ids(), vec![0, 1, 2]);
        assert!(aggregator.worker_stats(1).is_some());
        assert!(aggregator.worker_stats(3).is_none());
        assert_eq!(aggregator.num_workers(), 3);
    }
}
