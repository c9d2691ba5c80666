//! Execution context lifecycle
//!
//! A [`GeneratorContext`] owns the bucket set of exactly one execution context.
//! The set is built on start, used once per iteration and dropped on end, so
//! counts never leak between contexts or between restarts of the same context.
//!
//! # Lifecycle
//!
//! 1. **Start**: `on_context_start()` builds a fresh set from the shared config
//! 2. **Iterate**: `on_iteration_start()` draws once and binds the result
//! 3. **End**: `on_context_end()` drops the set and its counts
//!
//! # Example
//!
//! ```
//! use ratiogen::config::{Config, GeneratorConfig};
//! use ratiogen::distribution::bucket::BucketRow;
//! use ratiogen::worker::context::GeneratorContext;
//! use ratiogen::worker::variables::VariableMap;
//! use std::sync::Arc;
//!
//! let config = Arc::new(Config {
//!     generator: GeneratorConfig {
//!         variable_name: "amount".to_string(),
//!         output_format: "%.2f".to_string(),
//!         buckets: vec![BucketRow::new("1", "10", "1"), BucketRow::new("20", "30", "3")],
//!     },
//!     workers: Default::default(),
//!     output: Default::default(),
//! });
//!
//! let mut context = GeneratorContext::with_seed(0, config, 1)?;
//! let mut vars = VariableMap::new();
//!
//! context.on_context_start()?;
//! let draw = context.on_iteration_start(&mut vars)?;
//! assert_eq!(vars.get("amount"), Some(draw.formatted.as_str()));
//! context.on_context_end();
//! # Ok::<(), ratiogen::error::GeneratorError>(())
//! ```

use super::variables::Variables;
use crate::config::Config;
use crate::distribution::bucket::BucketSet;
use crate::distribution::selector::{Draw, Selector};
use crate::error::GeneratorError;
use crate::util::format::OutputFormat;
use std::sync::Arc;

/// Bucket state and selector for one execution context
pub struct GeneratorContext {
    id: usize,
    config: Arc<Config>,
    selector: Selector,
    buckets: Option<BucketSet>,
}

impl GeneratorContext {
    /// Create a context with an entropy-seeded selector
    ///
    /// Fails if the configured output format does not parse.
    pub fn new(id: usize, config: Arc<Config>) -> Result<Self, GeneratorError> {
        let format = OutputFormat::parse(&config.generator.output_format)?;
        Ok(Self::with_selector(id, config, Selector::new(format)))
    }

    /// Create a context whose selector is seeded for reproducible draws
    pub fn with_seed(id: usize, config: Arc<Config>, seed: u64) -> Result<Self, GeneratorError> {
        let format = OutputFormat::parse(&config.generator.output_format)?;
        Ok(Self::with_selector(id, config, Selector::with_seed(format, seed)))
    }

    pub fn with_selector(id: usize, config: Arc<Config>, selector: Selector) -> Self {
        Self {
            id,
            config,
            selector,
            buckets: None,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn variable_name(&self) -> &str {
        &self.config.generator.variable_name
    }

    pub fn format(&self) -> &OutputFormat {
        self.selector.format()
    }

    /// Live bucket set, if the context is started
    pub fn buckets(&self) -> Option<&BucketSet> {
        self.buckets.as_ref()
    }

    pub fn is_started(&self) -> bool {
        self.buckets.is_some()
    }

    /// Build a fresh bucket set with every count at 1
    ///
    /// Starting an already started context discards the old counts. On error the
    /// context is left without a set.
    pub fn on_context_start(&mut self) -> Result<(), GeneratorError> {
        if self.buckets.take().is_some() {
            tracing::debug!("context {}: restarted, previous counts discarded", self.id);
        }

        let set = BucketSet::from_rows(&self.config.generator.buckets)?;
        tracing::debug!("context {}: started with {} buckets", self.id, set.len());
        self.buckets = Some(set);
        Ok(())
    }

    /// Draw exactly once and bind the formatted value under the variable name
    ///
    /// Nothing is bound when the draw fails.
    pub fn on_iteration_start(&mut self, vars: &mut dyn Variables) -> Result<Draw, GeneratorError> {
        let set = self.buckets.as_mut().ok_or(GeneratorError::ContextNotStarted)?;
        let draw = self.selector.next(set)?;
        vars.bind(&self.config.generator.variable_name, draw.formatted.clone());
        Ok(draw)
    }

    /// Drop the bucket set and all counts
    pub fn on_context_end(&mut self) {
        if let Some(set) = self.buckets.take() {
            tracing::debug!(
                "context {}: ended after {} selections",
                self.id,
                set.total_count() - set.len() as u64
            );
        }
    }
}
