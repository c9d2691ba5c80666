//! Ratio-controlled value generation
//!
//! This module provides the bucket model and the adaptive selector that decides
//! which bucket the next value is drawn from.
//!
//! # Components
//!
//! - **Bucket / BucketSet**: value ranges with target ratios and observation counts
//! - **Selector**: deficit-score bucket selection plus in-range value draw
//! - **Uniform**: the in-bucket value distribution
//!
//! # Deficit Scheduling
//!
//! Every bucket carries a count that starts at 1. On each draw the selector scores
//! each bucket as `count / (total * ratio)` and serves the bucket with the smallest
//! score, i.e. the one most under-served relative to its target share. The observed
//! share of bucket `b` converges to `ratio(b) / sum(ratios)` much faster than
//! independent weighted sampling would.
//!
//! # Example
//!
//! ```
//! use ratiogen::distribution::bucket::{BucketRow, BucketSet};
//! use ratiogen::distribution::selector::Selector;
//! use ratiogen::util::format::OutputFormat;
//!
//! let rows = vec![
//!     BucketRow::new("1", "10", "0.1"),
//!     BucketRow::new("40", "70", "0.3"),
//!     BucketRow::new("71", "100", "0.6"),
//! ];
//! let mut set = BucketSet::from_rows(&rows)?;
//! let mut selector = Selector::with_seed(OutputFormat::parse("%.2f")?, 7);
//!
//! let draw = selector.next(&mut set)?;
//! assert_eq!(draw.row, 2);
//! assert!(draw.value >= 71.0 && draw.value <= 100.0);
//! # Ok::<(), ratiogen::error::GeneratorError>(())
//! ```

/// In-bucket value distribution
///
/// Once the selector has chosen a bucket, a distribution produces the actual value
/// inside that bucket's inclusive range.
///
/// # Thread Safety
///
/// Distributions must be `Send` so a worker can move its selector into its own
/// thread. Each worker owns its own instance; nothing is shared.
pub trait Distribution: Send {
    /// Draw a value in `[min, max]` (both inclusive)
    ///
    /// Callers guarantee `min <= max`. When `min == max` the result is `min`.
    fn sample(&mut self, min: f64, max: f64) -> f64;
}

pub mod bucket;
pub mod selector;
pub mod uniform;
