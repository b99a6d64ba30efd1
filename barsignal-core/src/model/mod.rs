//! Classifier training: time-ordered split, boosted trees, held-out scoring.

pub mod gbdt;
pub mod tree;

pub use gbdt::{GbdtParams, GradientBoostedClassifier};
pub use tree::{RegressionTree, TreeParams};

use serde::{Deserialize, Serialize};
use std::ops::Range;
use thiserror::Error;

use crate::domain::Label;
use crate::features::FEATURE_COUNT;

/// One model input row.
pub type FeatureArray = [f64; FEATURE_COUNT];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("cannot fit a model on an empty training set")]
    EmptyTrainingSet,

    #[error("feature rows ({features}) and labels ({labels}) differ in length")]
    LengthMismatch { features: usize, labels: usize },

    #[error("invalid model parameters: {0}")]
    InvalidParams(String),
}

/// Anything that maps a feature row to class probabilities.
pub trait Classifier: Send + Sync {
    /// Probability per known class. Probabilities sum to 1.
    fn predict_proba(&self, x: &FeatureArray) -> Vec<(Label, f64)>;

    /// Most probable class and its probability. Ties go to the lower label.
    fn predict(&self, x: &FeatureArray) -> (Label, f64) {
        self.predict_proba(x)
            .into_iter()
            .fold((Label::Hold, f64::NEG_INFINITY), |best, (label, p)| {
                if p > best.1 {
                    (label, p)
                } else {
                    best
                }
            })
    }
}

/// Leading training segment and trailing test segment, order preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSplit {
    pub train: Range<usize>,
    pub test: Range<usize>,
}

impl TimeSplit {
    /// `ceil(n * test_fraction)` trailing rows go to the test segment.
    pub fn new(n: usize, test_fraction: f64) -> Self {
        let n_test = ((n as f64) * test_fraction).ceil().max(0.0) as usize;
        let n_test = n_test.min(n);
        let n_train = n - n_test;
        Self {
            train: 0..n_train,
            test: n_train..n,
        }
    }

    pub fn n_train(&self) -> usize {
        self.train.len()
    }

    pub fn n_test(&self) -> usize {
        self.test.len()
    }
}

/// Held-out accuracy of a fitted classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub n_train: usize,
    pub n_test: usize,
    pub correct: usize,
    /// `None` when the test segment is empty.
    pub accuracy: Option<f64>,
}

impl Evaluation {
    pub fn score(
        model: &dyn Classifier,
        n_train: usize,
        x_test: &[FeatureArray],
        y_test: &[Label],
    ) -> Self {
        let correct = x_test
            .iter()
            .zip(y_test)
            .filter(|(x, y)| model.predict(x).0 == **y)
            .count();
        let n_test = x_test.len().min(y_test.len());
        Self {
            n_train,
            n_test,
            correct,
            accuracy: (n_test > 0).then(|| correct as f64 / n_test as f64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Always(Label);

    impl Classifier for Always {
        fn predict_proba(&self, _x: &FeatureArray) -> Vec<(Label, f64)> {
            vec![(self.0, 1.0)]
        }
    }

    #[test]
    fn split_80_20() {
        let split = TimeSplit::new(100, 0.2);
        assert_eq!(split.train, 0..80);
        assert_eq!(split.test, 80..100);
    }

    #[test]
    fn split_rounds_test_segment_up() {
        let split = TimeSplit::new(16, 0.2);
        assert_eq!(split.n_test(), 4);
        assert_eq!(split.n_train(), 12);
    }

    #[test]
    fn split_preserves_order() {
        let split = TimeSplit::new(7, 0.2);
        assert_eq!(split.train.end, split.test.start);
        assert_eq!(split.test.end, 7);
    }

    #[test]
    fn split_of_nothing() {
        let split = TimeSplit::new(0, 0.2);
        assert_eq!(split.n_train(), 0);
        assert_eq!(split.n_test(), 0);
    }

    #[test]
    fn predict_ties_go_to_first_class() {
        struct Even;
        impl Classifier for Even {
            fn predict_proba(&self, _x: &FeatureArray) -> Vec<(Label, f64)> {
                vec![(Label::Sell, 0.5), (Label::Buy, 0.5)]
            }
        }
        assert_eq!(Even.predict(&[0.0; FEATURE_COUNT]), (Label::Sell, 0.5));
    }

    #[test]
    fn evaluation_accuracy() {
        let x = vec![[0.0; FEATURE_COUNT]; 4];
        let y = [Label::Buy, Label::Buy, Label::Sell, Label::Buy];
        let eval = Evaluation::score(&Always(Label::Buy), 10, &x, &y);
        assert_eq!(eval.correct, 3);
        assert_eq!(eval.accuracy, Some(0.75));
        assert_eq!(eval.n_train, 10);
    }

    #[test]
    fn evaluation_of_empty_test_segment() {
        let eval = Evaluation::score(&Always(Label::Hold), 5, &[], &[]);
        assert_eq!(eval.accuracy, None);
    }
}
