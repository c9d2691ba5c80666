//! Draw verification
//!
//! Maps exported values back to the bucket that produced them. This is what an
//! independent auditor does with the values it receives: it only sees the
//! formatted text, so classification goes through the output format.
//!
//! # Limitations
//!
//! - Overlapping ranges classify into the first matching row
//! - A format with too little precision (e.g. `%d` on narrow ranges) can push a
//!   value outside its bucket; such values are reported as unclassified

use crate::distribution::bucket::BucketSet;
use crate::util::format::OutputFormat;

/// Classifies exported values into configuration rows
#[derive(Debug, Clone)]
pub struct BucketClassifier {
    ranges: Vec<(usize, f64, f64)>,
    format: OutputFormat,
}

impl BucketClassifier {
    pub fn new(set: &BucketSet, format: OutputFormat) -> Self {
        Self {
            ranges: set.iter().map(|b| (b.row(), b.min(), b.max())).collect(),
            format,
        }
    }

    /// Row whose range contains the rendered value
    pub fn classify(&self, rendered: &str) -> Option<usize> {
        self.format
            .parse_value(rendered)
            .and_then(|value| self.classify_value(value))
    }

    /// Row whose range contains `value`
    pub fn classify_value(&self, value: f64) -> Option<usize> {
        self.ranges
            .iter()
            .find(|(_, min, max)| value >= *min && value <= *max)
            .map(|(row, _, _)| *row)
    }

    pub fn num_buckets(&self) -> usize {
        self.ranges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::bucket::BucketRow;

    fn classifier(format: &str) -> BucketClassifier {
        let set = BucketSet::from_rows(&[
            BucketRow::new("1", "10", "0.1"),
            BucketRow::new("40", "70", "0.3"),
            BucketRow::new("71", "100", "0.6"),
        ])
        .unwrap();
        BucketClassifier::new(&set, OutputFormat::parse(format).unwrap())
    }

    #[test]
    fn test_classify_rendered_values() {
        let classifier = classifier("%.2f");
        assert_eq!(classifier.num_buckets(), 3);
        assert_eq!(classifier.classify("1.00"), Some(0));
        assert_eq!(classifier.classify("55.12"), Some(1));
        assert_eq!(classifier.classify("100.00"), Some(2));
    }

    #[test]
    fn test_gap_and_garbage_unclassified() {
        let classifier = classifier("%.2f");
        assert_eq!(classifier.classify("70.50"), None);
        assert_eq!(classifier.classify("abc"), None);
    }

    #[test]
    fn test_classify_with_literal_text() {
        let classifier = classifier("amount=%d USD");
        assert_eq!(classifier.classify("amount=42 USD"), Some(1));
        assert_eq!(classifier.classify("42"), None);
    }

    #[test]
    fn test_rounding_can_leave_range() {
        let set = BucketSet::from_bounds(&[(0.5, 0.9, 1.0)]).unwrap();
        let format = OutputFormat::parse("%.0f").unwrap();
        let classifier = BucketClassifier::new(&set, format.clone());

        assert_eq!(classifier.classify_value(0.6), Some(0));
        assert_eq!(classifier.classify(&format.render(0.6)), None);
    }
}
