//! Bucket model
//!
//! A [`Bucket`] is a value range plus a target ratio and an observation count.
//! A [`BucketSet`] is the collection of buckets owned by one execution context.
//!
//! # Counts
//!
//! Every bucket count starts at 1, not 0. The selection score divides by the
//! total count, and a non-zero starting count means the first picks are decided
//! by ratio alone.
//!
//! # Weights
//!
//! Scores divide by each bucket's ratio normalised against the largest ratio in
//! its set, so the weight lies in `(0, 1]`. Any positive finite ratio, however
//! large or small, then yields finite scores.
//!
//! # Ordering
//!
//! Buckets keep configuration row order. The selector breaks score ties by taking
//! the first bucket in that order, so selection is reproducible for a given
//! snapshot of counts.

use crate::error::{BucketField, GeneratorError};
use serde::{Deserialize, Serialize};

/// One configured bucket as entered by the user
///
/// Fields are kept as text until a context builds its [`BucketSet`], so parse
/// errors are reported against the row they came from. TOML numbers are accepted
/// too and converted to their text form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketRow {
    /// Lower bound of the value range (inclusive)
    #[serde(deserialize_with = "text_or_number::deserialize")]
    pub min: String,
    /// Upper bound of the value range (inclusive)
    #[serde(deserialize_with = "text_or_number::deserialize")]
    pub max: String,
    /// Target share, relative to the sum of all ratios
    #[serde(deserialize_with = "text_or_number::deserialize")]
    pub ratio: String,
}

impl BucketRow {
    pub fn new(min: impl Into<String>, max: impl Into<String>, ratio: impl Into<String>) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
            ratio: ratio.into(),
        }
    }
}

// Accepts `min = "1.5"` as well as `min = 1.5` or `min = 1`
mod text_or_number {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s,
            Raw::Int(i) => i.to_string(),
            Raw::Float(f) => f.to_string(),
        })
    }
}

/// A value range with a target ratio and an observation count
#[derive(Debug, Clone)]
pub struct Bucket {
    row: usize,
    min: f64,
    max: f64,
    ratio: f64,
    /// `ratio / max(ratios)` within the owning set
    weight: f64,
    count: u64,
}

impl Bucket {
    /// Create a bucket with a fresh count of 1
    ///
    /// Rejects non-finite bounds, `min > max`, spans too wide to represent and
    /// ratios that are not strictly positive. A bucket outside of a set has
    /// weight 1.
    pub fn new(row: usize, min: f64, max: f64, ratio: f64) -> Result<Self, GeneratorError> {
        if !min.is_finite() {
            return Err(GeneratorError::InvalidConfiguration {
                row,
                field: BucketField::Min,
                value: min.to_string(),
            });
        }
        if !max.is_finite() {
            return Err(GeneratorError::InvalidConfiguration {
                row,
                field: BucketField::Max,
                value: max.to_string(),
            });
        }
        if !ratio.is_finite() {
            return Err(GeneratorError::InvalidConfiguration {
                row,
                field: BucketField::Ratio,
                value: ratio.to_string(),
            });
        }
        if ratio <= 0.0 {
            return Err(GeneratorError::InvalidRatio { row, ratio });
        }
        if min > max || !(max - min).is_finite() {
            return Err(GeneratorError::InvalidRange { row, min, max });
        }

        Ok(Self {
            row,
            min,
            max,
            ratio,
            weight: 1.0,
            count: 1,
        })
    }

    /// Configuration row this bucket was built from
    pub fn row(&self) -> usize {
        self.row
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Ratio normalised against the largest ratio of the owning set
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Number of times this bucket was selected, plus the initial 1
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Whether `value` lies in this bucket's inclusive range
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Observed share relative to target share
    ///
    /// Smaller means more under-represented. `total` is the sum of all counts in
    /// the owning set and is never zero since every count starts at 1.
    #[inline]
    pub fn score(&self, total: u64) -> f64 {
        (self.count as f64 / total as f64) / self.weight
    }

    #[inline]
    pub(crate) fn increment(&mut self) {
        self.count += 1;
    }
}

impl PartialEq for Bucket {
    fn eq(&self, other: &Self) -> bool {
        self.min == other.min && self.max == other.max && self.ratio == other.ratio
    }
}

/// The buckets of one execution context
///
/// Built once when the context starts and dropped when it ends. A set is never
/// shared between contexts, so counts are plain integers.
#[derive(Debug, Clone, Default)]
pub struct BucketSet {
    buckets: Vec<Bucket>,
}

impl BucketSet {
    /// Build a set from configured rows, every count starting at 1
    ///
    /// Fails on the first row that does not parse or validate. An empty slice
    /// yields an empty set.
    pub fn from_rows(rows: &[BucketRow]) -> Result<Self, GeneratorError> {
        let mut buckets = Vec::with_capacity(rows.len());

        for (row, config) in rows.iter().enumerate() {
            let min = parse_field(row, BucketField::Min, &config.min)?;
            let max = parse_field(row, BucketField::Max, &config.max)?;
            let ratio = parse_field(row, BucketField::Ratio, &config.ratio)?;
            buckets.push(Bucket::new(row, min, max, ratio)?);
        }

        let set = Self::with_weights(buckets);
        set.warn_on_overlap();
        Ok(set)
    }

    /// Build a set from already-parsed `(min, max, ratio)` triples
    pub fn from_bounds(bounds: &[(f64, f64, f64)]) -> Result<Self, GeneratorError> {
        let buckets = bounds
            .iter()
            .enumerate()
            .map(|(row, &(min, max, ratio))| Bucket::new(row, min, max, ratio))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::with_weights(buckets))
    }

    fn with_weights(mut buckets: Vec<Bucket>) -> Self {
        let max_ratio = buckets.iter().map(|b| b.ratio).fold(0.0, f64::max);
        for bucket in &mut buckets {
            bucket.weight = bucket.ratio / max_ratio;
        }
        Self { buckets }
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Bucket> {
        self.buckets.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Bucket> {
        self.buckets.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bucket> {
        self.buckets.iter()
    }

    /// Sum of all bucket counts
    pub fn total_count(&self) -> u64 {
        self.buckets.iter().map(|b| b.count).sum()
    }

    /// Target share of the bucket at `index`: `ratio / sum(ratios)`
    ///
    /// Computed from the normalised weights so huge ratios do not overflow.
    pub fn target_share(&self, index: usize) -> Option<f64> {
        let total: f64 = self.buckets.iter().map(|b| b.weight).sum();
        self.buckets.get(index).map(|b| b.weight / total)
    }

    /// Current counts in row order
    pub fn counts(&self) -> Vec<u64> {
        self.buckets.iter().map(|b| b.count).collect()
    }

    /// Index of the first bucket whose range contains `value`
    ///
    /// With non-overlapping ranges this recovers the bucket that produced a draw.
    pub fn classify(&self, value: f64) -> Option<usize> {
        self.buckets.iter().position(|b| b.contains(value))
    }

    fn warn_on_overlap(&self) {
        for (i, a) in self.buckets.iter().enumerate() {
            for b in &self.buckets[i + 1..] {
                if a.min <= b.max && b.min <= a.max {
                    tracing::warn!(
                        "bucket rows {} [{}, {}] and {} [{}, {}] overlap; \
                         audits cannot tell them apart",
                        a.row,
                        a.min,
                        a.max,
                        b.row,
                        b.min,
                        b.max
                    );
                }
            }
        }
    }
}

impl<'a> IntoIterator for &'a BucketSet {
    type Item = &'a Bucket;
    type IntoIter = std::slice::Iter<'a, Bucket>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter()
    }
}

fn parse_field(row: usize, field: BucketField, text: &str) -> Result<f64, GeneratorError> {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(GeneratorError::InvalidConfiguration {
            row,
            field,
            value: text.to_string(),
        }),
    }
}
