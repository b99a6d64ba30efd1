//! Multi-class gradient-boosted trees (multinomial deviance).
//!
//! Each boosting round fits one regression tree per class to the residuals
//! `y_k - p_k` of the current softmax probabilities. Leaf outputs use a
//! one-step Newton update, `(K-1)/K * sum(r) / sum(|r| * (1 - |r|))`.
//! Initial scores are the log class priors of the training labels.
//!
//! Training is deterministic for fixed inputs and parameters. Row
//! subsampling, when enabled, draws from a `StdRng` seeded with `seed`.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::tree::{RegressionTree, TreeParams};
use super::{Classifier, FeatureArray, ModelError};
use crate::domain::Label;

/// Boosting hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GbdtParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// Fraction of training rows drawn (without replacement) per round.
    pub subsample: f64,
    pub seed: u64,
}

impl Default for GbdtParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_leaf: 1,
            subsample: 1.0,
            seed: 42,
        }
    }
}

impl GbdtParams {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.n_estimators == 0 {
            return Err(ModelError::InvalidParams("n_estimators must be >= 1".into()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ModelError::InvalidParams(format!(
                "learning_rate must be positive (got {})",
                self.learning_rate
            )));
        }
        if self.max_depth == 0 {
            return Err(ModelError::InvalidParams("max_depth must be >= 1".into()));
        }
        if self.min_samples_leaf == 0 {
            return Err(ModelError::InvalidParams("min_samples_leaf must be >= 1".into()));
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return Err(ModelError::InvalidParams(format!(
                "subsample must be in (0, 1] (got {})",
                self.subsample
            )));
        }
        Ok(())
    }

    fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            min_samples_leaf: self.min_samples_leaf,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedClassifier {
    classes: Vec<Label>,
    init_scores: Vec<f64>,
    learning_rate: f64,
    /// `rounds[m][k]` is the tree for class `k` in round `m`.
    rounds: Vec<Vec<RegressionTree>>,
}

impl GradientBoostedClassifier {
    pub fn fit(x: &[FeatureArray], y: &[Label], params: &GbdtParams) -> Result<Self, ModelError> {
        params.validate()?;
        if x.len() != y.len() {
            return Err(ModelError::LengthMismatch {
                features: x.len(),
                labels: y.len(),
            });
        }
        if x.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }

        let classes: Vec<Label> = y.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let n = x.len();
        let k = classes.len();

        if k == 1 {
            tracing::warn!(
                class = %classes[0],
                rows = n,
                "training labels contain a single class, fitting a constant model"
            );
            return Ok(Self {
                classes,
                init_scores: vec![0.0],
                learning_rate: params.learning_rate,
                rounds: Vec::new(),
            });
        }

        // One-hot targets, row-major.
        let targets: Vec<Vec<f64>> = y
            .iter()
            .map(|label| {
                classes
                    .iter()
                    .map(|c| if c == label { 1.0 } else { 0.0 })
                    .collect()
            })
            .collect();

        let init_scores: Vec<f64> = (0..k)
            .map(|c| {
                let count = targets.iter().filter(|t| t[c] == 1.0).count();
                (count as f64 / n as f64).ln()
            })
            .collect();

        let mut scores: Vec<Vec<f64>> = vec![init_scores.clone(); n];
        let mut rng = StdRng::seed_from_u64(params.seed);
        let tree_params = params.tree_params();
        let scale = (k as f64 - 1.0) / k as f64;
        let mut rounds = Vec::with_capacity(params.n_estimators);

        for round in 0..params.n_estimators {
            let probs: Vec<Vec<f64>> = scores.iter().map(|s| softmax(s)).collect();
            let sample = sample_rows(n, params.subsample, &mut rng);

            let mut trees = Vec::with_capacity(k);
            for c in 0..k {
                let residuals: Vec<f64> = (0..n).map(|i| targets[i][c] - probs[i][c]).collect();
                let tree = RegressionTree::fit(x, &residuals, &sample, &tree_params, |rows| {
                    let num: f64 = rows.iter().map(|&i| residuals[i]).sum();
                    let den: f64 = rows
                        .iter()
                        .map(|&i| residuals[i].abs() * (1.0 - residuals[i].abs()))
                        .sum();
                    if den.abs() < 1e-150 {
                        0.0
                    } else {
                        scale * num / den
                    }
                });
                for (i, row) in x.iter().enumerate() {
                    scores[i][c] += params.learning_rate * tree.predict(row);
                }
                trees.push(tree);
            }
            rounds.push(trees);

            tracing::trace!(round, deviance = deviance(&targets, &scores), "boosting round");
        }

        tracing::debug!(
            rows = n,
            classes = k,
            rounds = rounds.len(),
            "gradient boosted classifier fitted"
        );

        Ok(Self {
            classes,
            init_scores,
            learning_rate: params.learning_rate,
            rounds,
        })
    }

    /// Classes seen during training, ascending.
    pub fn classes(&self) -> &[Label] {
        &self.classes
    }

    pub fn n_rounds(&self) -> usize {
        self.rounds.len()
    }

    fn raw_scores(&self, x: &FeatureArray) -> Vec<f64> {
        let mut scores = self.init_scores.clone();
        for trees in &self.rounds {
            for (score, tree) in scores.iter_mut().zip(trees) {
                *score += self.learning_rate * tree.predict(x);
            }
        }
        scores
    }
}

impl Classifier for GradientBoostedClassifier {
    fn predict_proba(&self, x: &FeatureArray) -> Vec<(Label, f64)> {
        let probs = softmax(&self.raw_scores(x));
        self.classes.iter().copied().zip(probs).collect()
    }
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

fn sample_rows(n: usize, fraction: f64, rng: &mut StdRng) -> Vec<usize> {
    if fraction >= 1.0 {
        return (0..n).collect();
    }
    let amount = ((n as f64 * fraction).round() as usize).clamp(1, n);
    let mut rows = rand::seq::index::sample(rng, n, amount).into_vec();
    rows.sort_unstable();
    rows
}

/// Mean multinomial deviance.
fn deviance(targets: &[Vec<f64>], scores: &[Vec<f64>]) -> f64 {
    let total: f64 = targets
        .iter()
        .zip(scores)
        .map(|(t, s)| {
            let p = softmax(s);
            -t.iter()
                .zip(&p)
                .map(|(ti, pi)| ti * pi.max(1e-300).ln())
                .sum::<f64>()
        })
        .sum();
    total / targets.len().max(1) as f64
}
