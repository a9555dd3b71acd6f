//! Grouped-fold accumulators for sums, counts and means.

use std::collections::BTreeMap;

/// Round to 2 decimal places, leaving non-finite values untouched.
pub fn round2(value: f64) -> f64 {
    if value.is_finite() {
        (value * 100.0).round() / 100.0
    } else {
        value
    }
}

/// Running sum and count of one measure.
///
/// The sum is compensated (Neumaier) so long columns of cents do not drift.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accumulator {
    sum: f64,
    compensation: f64,
    count: usize,
    rows: usize,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one row; `None` counts the row but adds no value.
    pub fn push(&mut self, value: Option<f64>) {
        self.rows += 1;
        if let Some(v) = value {
            let t = self.sum + v;
            if self.sum.abs() >= v.abs() {
                self.compensation += (self.sum - t) + v;
            } else {
                self.compensation += (v - t) + self.sum;
            }
            self.sum = t;
            self.count += 1;
        }
    }

    /// Sum of non-null values (0 when there are none).
    pub fn sum(&self) -> f64 {
        self.sum + self.compensation
    }

    /// Number of non-null values.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Number of rows seen, null or not.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Mean of non-null values; undefined (`None`) without any.
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum() / self.count as f64)
    }
}

/// Fold records once into per-key accumulators.
///
/// Every key seen gets an entry, even when all its values are null.
pub fn group_fold<'a, T, K, I, FK, FV>(records: I, key: FK, value: FV) -> BTreeMap<K, Accumulator>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    K: Ord,
    FK: Fn(&'a T) -> Option<K>,
    FV: Fn(&'a T) -> Option<f64>,
{
    let mut groups: BTreeMap<K, Accumulator> = BTreeMap::new();
    for record in records {
        if let Some(k) = key(record) {
            groups.entry(k).or_default().push(value(record));
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.236), 1.24);
        assert_eq!(round2(-2.5), -2.5);
        assert!(round2(f64::NAN).is_nan());
    }

    #[test]
    fn test_accumulator_mean_and_nulls() {
        let mut acc = Accumulator::new();
        acc.push(Some(10.0));
        acc.push(None);
        acc.push(Some(20.0));
        assert_eq!(acc.sum(), 30.0);
        assert_eq!(acc.count(), 2);
        assert_eq!(acc.rows(), 3);
        assert_eq!(acc.mean(), Some(15.0));
    }

    #[test]
    fn test_empty_mean_is_undefined() {
        let mut acc = Accumulator::new();
        assert_eq!(acc.mean(), None);
        acc.push(None);
        assert_eq!(acc.mean(), None);
        assert_eq!(acc.sum(), 0.0);
    }

    #[test]
    fn test_compensated_sum() {
        let mut acc = Accumulator::new();
        for _ in 0..10 {
            acc.push(Some(0.1));
        }
        assert_eq!(acc.sum(), 1.0);
    }

    #[test]
    fn test_group_fold_keeps_all_null_groups() {
        let rows = vec![("a", Some(1.0)), ("b", None), ("a", Some(3.0))];
        let groups = group_fold(&rows, |r| Some(r.0), |r| r.1);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["a"].mean(), Some(2.0));
        assert_eq!(groups["b"].mean(), None);
        assert_eq!(groups["b"].rows(), 1);
    }
}
