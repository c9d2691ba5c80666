//! Worker thread implementation
//!
//! This module implements the Worker, the execution unit that drives one
//! generator context. Each worker thread runs independently, binding one drawn
//! value per iteration and recording what it produced.
//!
//! # Architecture
//!
//! - **GeneratorContext**: owns the worker's bucket set and selector
//! - **VariableMap**: the per-iteration variable store values are bound into
//! - **BucketClassifier**: re-classifies exported values for the audit
//! - **WorkerStats**: records produced values
//!
//! # Isolation
//!
//! Workers share only the read-only `Arc<Config>`. Each one builds its own bucket
//! set at start, so ratio convergence holds per worker and no counter is ever
//! touched by two threads.
//!
//! # Example
//!
//! ```
//! use ratiogen::config::{Config, GeneratorConfig, WorkerConfig};
//! use ratiogen::config::workload::CompletionMode;
//! use ratiogen::distribution::bucket::BucketRow;
//! use ratiogen::worker::Worker;
//! use std::sync::Arc;
//!
//! let config = Arc::new(Config {
//!     generator: GeneratorConfig {
//!         variable_name: "amount".to_string(),
//!         output_format: "%.2f".to_string(),
//!         buckets: vec![BucketRow::new("1", "10", "1"), BucketRow::new("20", "30", "3")],
//!     },
//!     workers: WorkerConfig {
//!         completion_mode: CompletionMode::Iterations { count: 400 },
//!         seed: Some(7),
//!         ..Default::default()
//!     },
//!     output: Default::default(),
//! });
//!
//! let mut worker = Worker::new(0, config)?;
//! let stats = worker.run()?;
//! assert_eq!(stats.iterations(), 400);
//! assert_eq!(stats.hits(0), 100);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod context;
pub mod variables;

use crate::config::workload::CompletionMode;
use crate::config::Config;
use crate::distribution::selector::Draw;
use crate::stats::WorkerStats;
use crate::util::verification::BucketClassifier;
use crate::Result;
use anyhow::Context;
use context::GeneratorContext;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use variables::VariableMap;

/// Iterations between clock reads in duration mode
const DURATION_CHECK_INTERVAL: u64 = 256;

/// Worker thread that drives one generator context
///
/// # Lifecycle
///
/// 1. **Creation**: `Worker::new()` prepares the context (no bucket set yet)
/// 2. **Execution**: `run()` starts the context, iterates, ends the context
/// 3. **Completion**: returns `WorkerStats` with the produced values
pub struct Worker {
    /// Worker ID (also the context id)
    id: usize,

    /// Shared configuration
    config: Arc<Config>,

    /// Generator context owning this worker's bucket set
    context: GeneratorContext,

    /// Variable store values are bound into
    variables: VariableMap,

    /// Statistics collector
    stats: WorkerStats,
}

impl Worker {
    /// Create a new worker
    ///
    /// With a master seed configured, the worker's selector is seeded from it and
    /// the worker id, so runs are reproducible and workers still differ.
    pub fn new(id: usize, config: Arc<Config>) -> Result<Self> {
        let context = match config.workers.seed {
            Some(seed) => {
                GeneratorContext::with_seed(id, Arc::clone(&config), derive_worker_seed(seed, id))
            }
            None => GeneratorContext::new(id, Arc::clone(&config)),
        }
        .with_context(|| format!("Failed to create generator context for worker {}", id))?;

        let stats = WorkerStats::new(config.generator.buckets.len());

        Ok(Self {
            id,
            config,
            context,
            variables: VariableMap::new(),
            stats,
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Variables bound by the most recent iteration
    pub fn variables(&self) -> &VariableMap {
        &self.variables
    }

    /// Run the worker to completion
    ///
    /// The context is ended even when an iteration fails; the error is then
    /// returned to the caller.
    pub fn run(&mut self) -> Result<WorkerStats> {
        self.context
            .on_context_start()
            .with_context(|| format!("Worker {} failed to start its context", self.id))?;

        let result = self.iterate();
        self.context.on_context_end();
        result?;

        tracing::debug!("worker {}: finished {} iterations", self.id, self.stats.iterations());
        Ok(std::mem::replace(
            &mut self.stats,
            WorkerStats::new(self.config.generator.buckets.len()),
        ))
    }

    fn iterate(&mut self) -> Result<()> {
        let classifier = match self.context.buckets() {
            Some(set) => BucketClassifier::new(set, self.context.format().clone()),
            None => anyhow::bail!("Worker {} has no live context", self.id),
        };
        let sample_every = self.config.workers.sample_every;
        let start = Instant::now();

        while !self.should_stop(start) {
            let draw = self
                .context
                .on_iteration_start(&mut self.variables)
                .with_context(|| {
                    format!("Worker {} iteration {} failed", self.id, self.stats.iterations())
                })?;

            self.record(&classifier, &draw);

            if let Some(every) = sample_every {
                if self.stats.iterations() % every == 0 {
                    tracing::debug!(
                        "worker {}: {}={} (row {})",
                        self.id,
                        self.context.variable_name(),
                        draw.formatted,
                        draw.row
                    );
                }
            }
        }

        Ok(())
    }

    #[inline]
    fn record(&mut self, classifier: &BucketClassifier, draw: &Draw) {
        let row = classifier.classify(&draw.formatted);
        if row != Some(draw.row) {
            tracing::trace!(
                "worker {}: value {} from row {} classified as {:?}",
                self.id,
                draw.formatted,
                draw.row,
                row
            );
        }
        self.stats.record(row, draw.value);
    }

    fn should_stop(&self, start: Instant) -> bool {
        let done = self.stats.iterations();
        match self.config.workers.completion_mode {
            CompletionMode::Iterations { count } => done >= count,
            CompletionMode::Duration { seconds } => {
                done % DURATION_CHECK_INTERVAL == 0
                    && start.elapsed() >= Duration::from_secs(seconds)
            }
        }
    }
}

/// Derive a per-worker seed from the master seed
pub fn derive_worker_seed(master_seed: u64, worker_id: usize) -> u64 {
    master_seed ^ (worker_id as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Run one worker per configured thread and collect their statistics
///
/// Results are returned in worker id order. The first worker error is returned
/// after all threads have been joined.
pub fn run_workers(config: Arc<Config>) -> Result<Vec<(usize, WorkerStats)>> {
    let threads = config.workers.threads;
    let mut handles = Vec::with_capacity(threads);

    for id in 0..threads {
        let mut worker = Worker::new(id, Arc::clone(&config))?;
        let handle = thread::Builder::new()
            .name(format!("ratiogen-worker-{}", id))
            .spawn(move || worker.run())
            .with_context(|| format!("Failed to spawn worker thread {}", id))?;
        handles.push((id, handle));
    }

    let mut results = Vec::with_capacity(threads);
    let mut first_error = None;

    for (id, handle) in handles {
        match handle.join() {
            Ok(Ok(stats)) => results.push((id, stats)),
            Ok(Err(e)) => {
                tracing::error!("worker {} failed: {:#}", id, e);
                first_error.get_or_insert(e);
            }
            Err(_) => {
                first_error.get_or_insert_with(|| anyhow::anyhow!("Worker {} panicked", id));
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(results),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GeneratorConfig, OutputConfig, WorkerConfig};
    use crate::distribution::bucket::BucketRow;

    fn create_test_config() -> Config {
        Config {
            generator: GeneratorConfig {
                variable_name: "price".to_string(),
                output_format: "%.2f".to_string(),
                buckets: vec![
                    BucketRow::new("1", "10", "0.1"),
                    BucketRow::new("40", "70", "0.3"),
                    BucketRow::new("71", "100", "0.6"),
                ],
            },
            workers: WorkerConfig {
                threads: 1,
                completion_mode: CompletionMode::Iterations { count: 10_000 },
                seed: Some(1234),
                sample_every: None,
            },
            output: OutputConfig::default(),
        }
    }

    #[test]
    fn test_worker_creation() {
        let config = Arc::new(create_test_config());
        let worker = Worker::new(3, config).unwrap();
        assert_eq!(worker.id(), 3);
        assert!(worker.variables().is_empty());
    }

    #[test]
    fn test_worker_creation_bad_format() {
        let mut config = create_test_config();
        config.generator.output_format = "%x".to_string();
        assert!(Worker::new(0, Arc::new(config)).is_err());
    }

    #[test]
    fn test_worker_run_iterations() {
        let mut worker = Worker::new(0, Arc::new(create_test_config())).unwrap();
        let stats = worker.run().unwrap();

        assert_eq!(stats.iterations(), 10_000);
        assert_eq!(stats.unclassified(), 0);
        assert_eq!(stats.bucket_hits().iter().sum::<u64>(), 10_000);
        assert!((stats.share(0) - 0.1).abs() < 0.001);
        assert!((stats.share(1) - 0.3).abs() < 0.001);
        assert!((stats.share(2) - 0.6).abs() < 0.001);
        assert!(stats.min_value().unwrap() >= 1.0);
        assert!(stats.max_value().unwrap() <= 100.0);
        assert!(worker.variables().get("price").is_some());
    }

    #[test]
    fn test_worker_run_twice_starts_fresh() {
        let mut config = create_test_config();
        config.workers.completion_mode = CompletionMode::Iterations { count: 10 };
        let mut worker = Worker::new(0, Arc::new(config)).unwrap();

        let first = worker.run().unwrap();
        let second = worker.run().unwrap();

        // Bucket schedule only depends on counts, which restart from 1
        assert_eq!(first.bucket_hits(), second.bucket_hits());
        assert_eq!(second.iterations(), 10);
    }

    #[test]
    fn test_worker_run_invalid_bucket() {
        let mut config = create_test_config();
        config.generator.buckets[1].max = "seventy".to_string();
        let mut worker = Worker::new(0, Arc::new(config)).unwrap();

        let err = worker.run().unwrap_err();
        assert!(err.to_string().contains("failed to start its context"));
    }

    #[test]
    fn test_worker_run_empty_buckets() {
        let mut config = create_test_config();
        config.generator.buckets.clear();
        let mut worker = Worker::new(0, Arc::new(config)).unwrap();

        let err = worker.run().unwrap_err();
        assert_eq!(
            err.downcast_ref::<crate::error::GeneratorError>(),
            Some(&crate::error::GeneratorError::EmptySet)
        );
        assert!(worker.variables().is_empty());
    }

    #[test]
    fn test_worker_run_duration() {
        let mut config = create_test_config();
        config.workers.completion_mode = CompletionMode::Duration { seconds: 1 };
        let mut worker = Worker::new(0, Arc::new(config)).unwrap();

        let start = Instant::now();
        let stats = worker.run().unwrap();
        assert!(start.elapsed() >= Duration::from_secs(1));
        assert!(stats.iterations() > 0);
    }

    #[test]
    fn test_seeded_workers_reproducible() {
        let config = Arc::new(create_test_config());
        let a = Worker::new(0, Arc::clone(&config)).unwrap().run().unwrap();
        let b = Worker::new(0, Arc::clone(&config)).unwrap().run().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_derive_worker_seed_differs_per_worker() {
        assert_ne!(derive_worker_seed(42, 0), derive_worker_seed(42, 1));
        assert_eq!(derive_worker_seed(42, 3), derive_worker_seed(42, 3));
    }

    #[test]
    fn test_run_workers() {
        let mut config = create_test_config();
        config.workers.threads = 4;
        config.workers.completion_mode = CompletionMode::Iterations { count: 1_000 };

        let results = run_workers(Arc::new(config)).unwrap();
        assert_eq!(results.len(), 4);

        for (i, (id, stats)) in results.iter().enumerate() {
            assert_eq!(*id, i);
            assert_eq!(stats.iterations(), 1_000);
            assert_eq!(stats.bucket_hits(), &[100, 300, 600]);
        }
    }

    #[test]
    fn test_run_workers_propagates_error() {
        let mut config = create_test_config();
        config.workers.threads = 2;
        config.generator.buckets[0].ratio = "-1".to_string();

        assert!(run_workers(Arc::new(config)).is_err());
    }
}
