//! Generator error taxonomy
//!
//! Errors raised by the bucket model, the selector and the context lifecycle.
//! Configuration loading and orchestration wrap these in `anyhow` with context.

use thiserror::Error;

/// Errors produced by the ratio generator core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeneratorError {
    /// A bucket field could not be parsed as a finite number
    #[error("bucket row {row}: {field} {value:?} is not a valid number")]
    InvalidConfiguration {
        row: usize,
        field: BucketField,
        value: String,
    },

    /// A bucket ratio is zero or negative
    #[error("bucket row {row}: ratio must be positive, got {ratio}")]
    InvalidRatio { row: usize, ratio: f64 },

    /// A bucket's lower bound exceeds its upper bound
    #[error("bucket row {row}: min ({min}) must be <= max ({max})")]
    InvalidRange { row: usize, min: f64, max: f64 },

    /// Selection attempted on a set with no buckets
    #[error("cannot draw from an empty bucket set")]
    EmptySet,

    /// The output format specifier could not be parsed
    #[error("invalid output format {format:?}: {reason}")]
    InvalidFormat { format: String, reason: String },

    /// An iteration was requested outside of a started context
    #[error("context has not been started")]
    ContextNotStarted,
}

/// Field of a bucket configuration row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketField {
    Min,
    Max,
    Ratio,
}

impl std::fmt::Display for BucketField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BucketField::Min => write!(f, "min"),
            BucketField::Max => write!(f, "max"),
            BucketField::Ratio => write!(f, "ratio"),
        }
    }
}
