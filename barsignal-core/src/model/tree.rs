//! CART regression tree used as the weak learner.
//!
//! Splits minimise squared error of the fitted targets. Leaf outputs come
//! from a caller-supplied function so the booster can apply its own
//! Newton step. Nodes are stored in a flat arena; index 0 is the root.

use serde::{Deserialize, Serialize};

use super::FeatureArray;

/// Gains at or below this are treated as no improvement.
const MIN_GAIN: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 3,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl RegressionTree {
    /// Fit on the rows named by `indices`.
    ///
    /// `targets` is indexed like `x`. `leaf_value` receives the row indices
    /// that end up in a leaf and returns that leaf's output.
    pub fn fit<F>(
        x: &[FeatureArray],
        targets: &[f64],
        indices: &[usize],
        params: &TreeParams,
        leaf_value: F,
    ) -> Self
    where
        F: Fn(&[usize]) -> f64,
    {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(x, targets, indices.to_vec(), 0, params, &leaf_value);
        tree
    }

    pub fn predict(&self, x: &FeatureArray) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    fn grow<F>(
        &mut self,
        x: &[FeatureArray],
        targets: &[f64],
        indices: Vec<usize>,
        depth: usize,
        params: &TreeParams,
        leaf_value: &F,
    ) -> usize
    where
        F: Fn(&[usize]) -> f64,
    {
        let node_idx = self.nodes.len();
        self.nodes.push(Node::Leaf { value: 0.0 });

        let split = if depth < params.max_depth {
            best_split(x, targets, &indices, params.min_samples_leaf)
        } else {
            None
        };

        match split {
            Some(split) => {
                let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = indices
                    .into_iter()
                    .partition(|&i| x[i][split.feature] <= split.threshold);
                let left = self.grow(x, targets, left_rows, depth + 1, params, leaf_value);
                let right = self.grow(x, targets, right_rows, depth + 1, params, leaf_value);
                self.nodes[node_idx] = Node::Split {
                    feature: split.feature,
                    threshold: split.threshold,
                    left,
                    right,
                };
            }
            None => {
                self.nodes[node_idx] = Node::Leaf {
                    value: leaf_value(&indices),
                };
            }
        }
        node_idx
    }
}

/// Exhaustive search over features and midpoints between distinct values.
///
/// Ties keep the earliest candidate: lowest feature index, then lowest threshold.
fn best_split(
    x: &[FeatureArray],
    targets: &[f64],
    indices: &[usize],
    min_samples_leaf: usize,
) -> Option<BestSplit> {
    let n = indices.len();
    if n < 2 * min_samples_leaf.max(1) {
        return None;
    }

    let total: f64 = indices.iter().map(|&i| targets[i]).sum();
    let parent_score = total * total / n as f64;
    let mut best: Option<BestSplit> = None;
    let mut sorted = indices.to_vec();

    for feature in 0..x.first().map_or(0, |row| row.len()) {
        sorted.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

        let mut left_sum = 0.0;
        for k in 0..n - 1 {
            left_sum += targets[sorted[k]];
            let n_left = k + 1;
            let n_right = n - n_left;
            if n_left < min_samples_leaf || n_right < min_samples_leaf {
                continue;
            }
            let here = x[sorted[k]][feature];
            let next = x[sorted[k + 1]][feature];
            if here >= next {
                continue;
            }

            let right_sum = total - left_sum;
            let gain = left_sum * left_sum / n_left as f64 + right_sum * right_sum / n_right as f64
                - parent_score;
            let better = match &best {
                Some(b) => gain > b.gain + MIN_GAIN,
                None => gain > MIN_GAIN,
            };
            if better {
                let mut threshold = here + (next - here) / 2.0;
                // Midpoint can round up to `next` for adjacent floats.
                if threshold >= next {
                    threshold = here;
                }
                best = Some(BestSplit {
                    feature,
                    threshold,
                    gain,
                });
            }
        }
    }

    best
}
