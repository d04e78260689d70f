//! Training trace: per-iteration cost and classification counts.
//!
//! Every [`learn`](crate::network::NeuralNetwork::learn) call appends one
//! [`IterationRecord`] keyed by the iteration it ran at, and folds the
//! record's confusion counts into a running cumulative total. The trace is a
//! pure read sink: external consumers (progress reporting, plotting) only
//! ever read it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Classification threshold applied to both predicted and expected values.
pub const CLASSIFICATION_THRESHOLD: f64 = 0.5;

/// Confusion-style counters for threshold classification.
///
/// # Example
///
/// ```
/// use nevo_network::trace::ConfusionCounts;
///
/// let counts = ConfusionCounts::from_outputs(&[0.9, 0.2], &[1.0, 1.0]);
/// assert_eq!(counts.true_positives, 1);
/// assert_eq!(counts.false_negatives, 1);
/// assert_eq!(counts.recall(), 0.5);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    pub true_positives: u64,
    pub false_positives: u64,
    pub true_negatives: u64,
    pub false_negatives: u64,
}

impl ConfusionCounts {
    /// Classifies each predicted/expected value pair at the 0.5 threshold and
    /// counts the outcomes.
    #[must_use]
    pub fn from_outputs(predicted: &[f64], expected: &[f64]) -> Self {
        let mut counts = Self::default();
        for (prediction, target) in predicted.iter().zip(expected) {
            let positive = *prediction >= CLASSIFICATION_THRESHOLD;
            let expected_positive = *target >= CLASSIFICATION_THRESHOLD;
            match (positive, expected_positive) {
                (true, true) => counts.true_positives += 1,
                (true, false) => counts.false_positives += 1,
                (false, false) => counts.true_negatives += 1,
                (false, true) => counts.false_negatives += 1,
            }
        }
        counts
    }

    /// Adds another set of counts into this one, saturating on overflow.
    pub const fn accumulate(&mut self, other: Self) {
        self.true_positives = self.true_positives.saturating_add(other.true_positives);
        self.false_positives = self.false_positives.saturating_add(other.false_positives);
        self.true_negatives = self.true_negatives.saturating_add(other.true_negatives);
        self.false_negatives = self.false_negatives.saturating_add(other.false_negatives);
    }

    /// Returns the total number of classified values.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    /// Fraction of correct classifications, or `0.0` when nothing was counted.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }

    /// Fraction of predicted positives that were correct, or `0.0` when no
    /// positives were predicted.
    #[must_use]
    pub fn precision(&self) -> f64 {
        ratio(
            self.true_positives,
            self.true_positives + self.false_positives,
        )
    }

    /// Fraction of actual positives that were found, or `0.0` when there were
    /// no actual positives.
    #[must_use]
    pub fn recall(&self) -> f64 {
        ratio(
            self.true_positives,
            self.true_positives + self.false_negatives,
        )
    }

    /// Harmonic mean of precision and recall, or `0.0` when both are zero.
    #[must_use]
    pub fn f1(&self) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        }
    }
}

#[expect(clippy::cast_precision_loss)]
fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// One training iteration's outcome: sample cost plus its confusion counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// Mean squared error of the sample at this iteration.
    pub cost: f64,
    /// Threshold-classification counts of the sample's output elements.
    pub counts: ConfusionCounts,
}

/// Ordered-by-iteration history of training records.
#[derive(Debug, Default, Clone)]
pub struct TrainingTrace {
    records: BTreeMap<u64, IterationRecord>,
    cumulative: ConfusionCounts,
}

impl TrainingTrace {
    pub(crate) fn record(&mut self, iteration: u64, record: IterationRecord) {
        self.cumulative.accumulate(record.counts);
        self.records.insert(iteration, record);
    }

    /// Returns all records keyed by the iteration they were produced at.
    #[must_use]
    pub const fn records(&self) -> &BTreeMap<u64, IterationRecord> {
        &self.records
    }

    /// Returns the counts accumulated over every recorded iteration.
    #[must_use]
    pub const fn cumulative(&self) -> ConfusionCounts {
        self.cumulative
    }

    /// Returns the number of recorded iterations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the most recent record, if any.
    #[must_use]
    pub fn latest(&self) -> Option<(u64, &IterationRecord)> {
        self.records
            .last_key_value()
            .map(|(iteration, record)| (*iteration, record))
    }

    /// Iterates the recorded costs in iteration order.
    pub fn costs(&self) -> impl Iterator<Item = f64> + '_ {
        self.records.values().map(|record| record.cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_outputs_classifies_at_threshold() {
        let counts = ConfusionCounts::from_outputs(&[0.9, 0.6, 0.1, 0.4], &[1.0, 0.0, 0.0, 1.0]);
        assert_eq!(
            counts,
            ConfusionCounts {
                true_positives: 1,
                false_positives: 1,
                true_negatives: 1,
                false_negatives: 1,
            }
        );
    }

    #[test]
    fn test_derived_metrics() {
        let counts = ConfusionCounts {
            true_positives: 6,
            false_positives: 2,
            true_negatives: 10,
            false_negatives: 2,
        };
        assert_eq!(counts.total(), 20);
        assert_eq!(counts.accuracy(), 0.8);
        assert_eq!(counts.precision(), 0.75);
        assert_eq!(counts.recall(), 0.75);
        assert!((counts.f1() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_metrics_with_empty_denominators_are_zero() {
        let counts = ConfusionCounts::default();
        assert_eq!(counts.accuracy(), 0.0);
        assert_eq!(counts.precision(), 0.0);
        assert_eq!(counts.recall(), 0.0);
        assert_eq!(counts.f1(), 0.0);

        let only_negatives = ConfusionCounts {
            true_negatives: 4,
            ..ConfusionCounts::default()
        };
        assert_eq!(only_negatives.accuracy(), 1.0);
        assert_eq!(only_negatives.precision(), 0.0);
        assert_eq!(only_negatives.recall(), 0.0);
        assert_eq!(only_negatives.f1(), 0.0);
    }

    #[test]
    fn test_accumulate_saturates() {
        let mut counts = ConfusionCounts {
            true_positives: u64::MAX,
            ..ConfusionCounts::default()
        };
        counts.accumulate(ConfusionCounts {
            true_positives: 1,
            false_positives: 2,
            ..ConfusionCounts::default()
        });
        assert_eq!(counts.true_positives, u64::MAX);
        assert_eq!(counts.false_positives, 2);
    }

    #[test]
    fn test_trace_orders_by_iteration_and_accumulates() {
        let mut trace = TrainingTrace::default();
        assert!(trace.is_empty());

        let first = IterationRecord {
            cost: 0.5,
            counts: ConfusionCounts::from_outputs(&[0.9], &[1.0]),
        };
        let second = IterationRecord {
            cost: 0.25,
            counts: ConfusionCounts::from_outputs(&[0.1], &[1.0]),
        };
        trace.record(0, first);
        trace.record(1, second);

        assert_eq!(trace.len(), 2);
        assert_eq!(trace.costs().collect::<Vec<_>>(), vec![0.5, 0.25]);
        assert_eq!(trace.latest(), Some((1, &second)));
        assert_eq!(trace.cumulative().true_positives, 1);
        assert_eq!(trace.cumulative().false_negatives, 1);
    }
}
