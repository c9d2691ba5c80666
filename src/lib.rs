//! ratiogen - Ratio-controlled random value generator
//!
//! ratiogen produces random numeric values for load-test parameterization. Values
//! are drawn from configured ranges ("buckets") so that, over a run, each range
//! receives its target share of draws.
//!
//! # Architecture
//!
//! - **Buckets**: `(min, max, ratio)` rows with a per-context selection count
//! - **Selector**: deterministic deficit-driven choice of the next bucket, then a
//!   uniform draw inside it
//! - **Contexts**: each worker owns its own bucket set; nothing is shared
//! - **Stats**: observed vs target shares, re-derived from the exported values

pub mod config;
pub mod distribution;
pub mod error;
pub mod output;
pub mod stats;
pub mod util;
pub mod worker;

// Re-export commonly used types
pub use config::Config;
pub use error::GeneratorError;
pub use worker::Worker;

/// Result type used throughout ratiogen
pub type Result<T> = anyhow::Result<T>;
