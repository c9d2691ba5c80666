//! Deficit-score bucket selector
//!
//! The selector serves the bucket that is most under-represented relative to its
//! target ratio, draws a value inside that bucket's range and formats it.
//!
//! # Algorithm
//!
//! 1. `total = sum(count)` over every bucket, before this pick
//! 2. `score(b) = (count(b) / total) / weight(b)`, where `weight(b)` is the
//!    ratio normalised against the largest ratio of the set
//! 3. pick the minimum score; ties go to the lowest configuration row
//! 4. draw uniformly from `[min, max]` of the chosen bucket
//! 5. increment the chosen bucket's count
//! 6. format the value
//!
//! Consecutive picks are deliberately not independent: a bucket that was just
//! served becomes less likely to be served again until the others catch up.

use super::bucket::BucketSet;
use super::uniform::UniformDistribution;
use super::Distribution;
use crate::error::GeneratorError;
use crate::util::format::OutputFormat;

/// Result of one selection
#[derive(Debug, Clone, PartialEq)]
pub struct Draw {
    /// Index of the chosen bucket in its set
    pub index: usize,
    /// Configuration row of the chosen bucket
    pub row: usize,
    /// Raw drawn value
    pub value: f64,
    /// Value rendered with the output format
    pub formatted: String,
}

/// Adaptive bucket selector
///
/// Owns the value distribution and the output format. One selector per
/// execution context.
pub struct Selector {
    distribution: Box<dyn Distribution>,
    format: OutputFormat,
}

impl Selector {
    /// Create a selector with an entropy-seeded uniform distribution
    pub fn new(format: OutputFormat) -> Self {
        Self::with_distribution(format, Box::new(UniformDistribution::new()))
    }

    /// Create a selector with a seeded uniform distribution
    pub fn with_seed(format: OutputFormat, seed: u64) -> Self {
        Self::with_distribution(format, Box::new(UniformDistribution::with_seed(seed)))
    }

    pub fn with_distribution(format: OutputFormat, distribution: Box<dyn Distribution>) -> Self {
        Self { distribution, format }
    }

    pub fn format(&self) -> &OutputFormat {
        &self.format
    }

    /// Index of the bucket the next draw would come from
    ///
    /// Pure function of the set's counts and ratios. Returns `None` for an empty
    /// set.
    pub fn pick(set: &BucketSet) -> Option<usize> {
        let total = set.total_count();
        let mut best: Option<(usize, f64)> = None;

        for (index, bucket) in set.iter().enumerate() {
            let score = bucket.score(total);
            match best {
                Some((_, best_score)) if score >= best_score => {}
                _ => best = Some((index, score)),
            }
        }

        best.map(|(index, _)| index)
    }

    /// Configuration rows of the next `n` picks, without touching `set`
    pub fn preview(set: &BucketSet, n: usize) -> Vec<usize> {
        let mut scratch = set.clone();
        let mut rows = Vec::with_capacity(n);

        for _ in 0..n {
            let Some(bucket) = Self::pick(&scratch).and_then(|index| scratch.get_mut(index)) else {
                break;
            };
            bucket.increment();
            rows.push(bucket.row());
        }

        rows
    }

    /// Select a bucket, draw a value from it and record the selection
    pub fn next(&mut self, set: &mut BucketSet) -> Result<Draw, GeneratorError> {
        let index = Self::pick(set).ok_or(GeneratorError::EmptySet)?;
        let bucket = set.get_mut(index).ok_or(GeneratorError::EmptySet)?;

        let value = self.distribution.sample(bucket.min(), bucket.max());
        bucket.increment();

        Ok(Draw {
            index,
            row: bucket.row(),
            value,
            formatted: self.format.render(value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::bucket::BucketRow;

    fn three_buckets() -> BucketSet {
        BucketSet::from_rows(&[
            BucketRow::new("1", "10", "0.1"),
            BucketRow::new("40", "70", "0.3"),
            BucketRow::new("71", "100", "0.6"),
        ])
        .unwrap()
    }

    fn selector(seed: u64) -> Selector {
        Selector::with_seed(OutputFormat::parse("%.2f").unwrap(), seed)
    }

    /// Always returns the lower bound
    struct LowerBound;

    impl Distribution for LowerBound {
        fn sample(&mut self, min: f64, _max: f64) -> f64 {
            min
        }
    }

    #[test]
    fn test_first_draw_serves_largest_ratio() {
        let mut set = three_buckets();
        let mut selector = selector(1);

        let draw = selector.next(&mut set).unwrap();
        assert_eq!(draw.index, 2);
        assert_eq!(draw.row, 2);
        assert!(draw.value >= 71.0 && draw.value <= 100.0);
        assert_eq!(set.counts(), vec![1, 1, 2]);
    }

    #[test]
    fn test_formatted_value_matches_format() {
        let mut set = three_buckets();
        let mut selector = Selector::with_distribution(
            OutputFormat::parse("%.1f").unwrap(),
            Box::new(LowerBound),
        );

        let draw = selector.next(&mut set).unwrap();
        assert_eq!(draw.value, 71.0);
        assert_eq!(draw.formatted, "71.0");
    }

    #[test]
    fn test_empty_set_fails() {
        let mut set = BucketSet::from_rows(&[]).unwrap();
        let mut selector = selector(1);
        assert_eq!(selector.next(&mut set), Err(GeneratorError::EmptySet));
        assert_eq!(Selector::pick(&set), None);
    }

    #[test]
    fn test_tie_goes_to_lowest_row() {
        let set =
            BucketSet::from_bounds(&[(0.0, 1.0, 1.0), (2.0, 3.0, 1.0), (4.0, 5.0, 1.0)]).unwrap();
        assert_eq!(Selector::pick(&set), Some(0));
    }

    #[test]
    fn test_equal_ratios_round_robin() {
        let mut set =
            BucketSet::from_bounds(&[(0.0, 1.0, 1.0), (2.0, 3.0, 1.0), (4.0, 5.0, 1.0)]).unwrap();
        let mut selector = selector(9);

        let rows: Vec<usize> = (0..6).map(|_| selector.next(&mut set).unwrap().row).collect();
        assert_eq!(rows, vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn test_preview_matches_draws_and_leaves_set() {
        let mut set = three_buckets();
        let preview = Selector::preview(&set, 10);
        assert_eq!(preview[0], 2);
        assert_eq!(set.counts(), vec![1, 1, 1]);

        let mut selector = selector(3);
        let rows: Vec<usize> = (0..10).map(|_| selector.next(&mut set).unwrap().row).collect();
        assert_eq!(rows, preview);

        assert!(Selector::preview(&BucketSet::default(), 5).is_empty());
    }

    #[test]
    fn test_pick_is_deterministic_for_snapshot() {
        let mut set = three_buckets();
        let mut selector = selector(5);
        for _ in 0..17 {
            selector.next(&mut set).unwrap();
        }

        let snapshot = set.clone();
        let first = Selector::pick(&snapshot);
        for _ in 0..10 {
            assert_eq!(Selector::pick(&snapshot), first);
        }
        assert_eq!(snapshot.counts(), set.counts());
    }

    #[test]
    fn test_counts_increase_by_one_on_selected_bucket_only() {
        let mut set = three_buckets();
        let mut selector = selector(11);

        for _ in 0..1000 {
            let before = set.counts();
            let draw = selector.next(&mut set).unwrap();
            let after = set.counts();

            for (i, (b, a)) in before.iter().zip(after.iter()).enumerate() {
                if i == draw.index {
                    assert_eq!(*a, b + 1);
                } else {
                    assert_eq!(a, b);
                }
            }
        }
    }

    #[test]
    fn test_values_stay_in_chosen_range() {
        let mut set =
            BucketSet::from_bounds(&[(-5.0, -1.0, 2.0), (0.0, 0.0, 1.0), (1e6, 2e6, 3.0)]).unwrap();
        let mut selector = selector(21);

        for _ in 0..5000 {
            let draw = selector.next(&mut set).unwrap();
            let bucket = set.get(draw.index).unwrap();
            assert!(
                bucket.contains(draw.value),
                "{} outside [{}, {}]",
                draw.value,
                bucket.min(),
                bucket.max()
            );
        }
    }

    #[test]
    fn test_convergence_to_ratios() {
        let mut set = three_buckets();
        let mut selector = selector(42);
        let iterations = 100_000u64;
        let mut hits = [0u64; 3];

        for _ in 0..iterations {
            hits[selector.next(&mut set).unwrap().index] += 1;
        }

        let expected = [0.1, 0.3, 0.6];
        for (i, &h) in hits.iter().enumerate() {
            let observed = h as f64 / iterations as f64;
            assert!(
                (observed - expected[i]).abs() < 0.001,
                "bucket {} observed {} expected {}",
                i,
                observed,
                expected[i]
            );
        }
    }

    #[test]
    fn test_short_run_tracks_ratios() {
        // Deficit scheduling stays close to target after only a few draws
        let mut set = BucketSet::from_bounds(&[(0.0, 1.0, 1.0), (2.0, 3.0, 3.0)]).unwrap();
        let mut selector = selector(3);
        let mut hits = [0u64; 2];

        for _ in 0..40 {
            hits[selector.next(&mut set).unwrap().index] += 1;
        }
        assert!((hits[0] as i64 - 10).abs() <= 1, "hits = {:?}", hits);
    }

    #[test]
    fn test_unnormalized_ratios() {
        let mut set = BucketSet::from_bounds(&[(0.0, 1.0, 2.0), (2.0, 3.0, 6.0)]).unwrap();
        let mut selector = selector(8);
        let mut hits = [0u64; 2];

        for _ in 0..8000 {
            hits[selector.next(&mut set).unwrap().index] += 1;
        }
        assert!((hits[0] as i64 - 2000).abs() <= 2, "hits = {:?}", hits);
    }

    #[test]
    fn test_extreme_ratios_split_evenly() {
        for ratio in [1e308, f64::MAX, 5e-324, f64::MIN_POSITIVE] {
            let mut set = BucketSet::from_bounds(&[(0.0, 1.0, ratio), (2.0, 3.0, ratio)]).unwrap();
            let mut selector = selector(13);
            let mut hits = [0u64; 2];

            for _ in 0..1000 {
                hits[selector.next(&mut set).unwrap().index] += 1;
            }
            assert_eq!(hits, [500, 500], "ratio {}", ratio);
        }
    }

    #[test]
    fn test_extreme_ratio_proportions() {
        let mut set = BucketSet::from_bounds(&[(0.0, 1.0, 1e-320), (2.0, 3.0, 3e-320)]).unwrap();
        let mut selector = selector(14);
        let mut hits = [0u64; 2];

        for _ in 0..4000 {
            hits[selector.next(&mut set).unwrap().index] += 1;
        }
        assert!((hits[0] as i64 - 1000).abs() <= 1, "hits = {:?}", hits);
    }

    #[test]
    fn test_widest_representable_span_draws() {
        let mut set = BucketSet::from_bounds(&[(-8e307, 8e307, 1.0)]).unwrap();
        let mut selector = selector(15);

        for _ in 0..100 {
            let draw = selector.next(&mut set).unwrap();
            assert!(set.get(0).unwrap().contains(draw.value));
        }
    }
}
