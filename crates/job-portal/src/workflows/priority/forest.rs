//! Bagged regression trees.
//!
//! Each tree is grown to purity on a bootstrap sample, choosing at every node the
//! threshold that most reduces the squared error of the targets. The ensemble
//! prediction is the mean of the tree predictions.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Fixed ensemble configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub seed: u64,
    pub test_fraction: f64,
    pub min_samples_split: usize,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            seed: 42,
            test_fraction: 0.2,
            min_samples_split: 2,
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

/// Single regression tree stored as a flat node arena rooted at index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
}

impl RegressionTree {
    pub fn fit(
        rows: &[Vec<f64>],
        targets: &[f64],
        samples: Vec<usize>,
        min_samples_split: usize,
    ) -> Self {
        let mut nodes = vec![Node::Leaf { value: 0.0 }];
        let mut pending = vec![(0usize, samples)];

        while let Some((index, samples)) = pending.pop() {
            let mean = mean_of(targets, &samples);
            let split = if samples.len() >= min_samples_split.max(2) {
                best_split(rows, targets, &samples)
            } else {
                None
            };

            let Some(split) = split else {
                nodes[index] = Node::Leaf { value: mean };
                continue;
            };

            let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
                .into_iter()
                .partition(|&sample| rows[sample][split.feature] <= split.threshold);

            let left = nodes.len();
            nodes.push(Node::Leaf { value: 0.0 });
            let right = nodes.len();
            nodes.push(Node::Leaf { value: 0.0 });
            nodes[index] = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };

            pending.push((left, left_samples));
            pending.push((right, right_samples));
        }

        Self { nodes }
    }

    /// Leaf value reached by `row`, or NaN when the arena does not lead to a leaf.
    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                None => return f64::NAN,
                Some(Node::Leaf { value }) => return *value,
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = row.get(*feature).copied().unwrap_or(0.0);
                    index = if value <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Children always sit after their parent, so every walk terminates.
    fn check(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (index, node) in self.nodes.iter().enumerate() {
            if let Node::Split {
                feature,
                left,
                right,
                ..
            } = node
            {
                if *feature >= n_features {
                    return Err(format!(
                        "node {index} splits on feature {feature} of {n_features}"
                    ));
                }
                for child in [*left, *right] {
                    if child <= index || child >= self.nodes.len() {
                        return Err(format!("node {index} points at invalid child {child}"));
                    }
                }
            }
        }
        Ok(())
    }
}

fn mean_of(targets: &[f64], samples: &[usize]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|&sample| targets[sample]).sum::<f64>() / samples.len() as f64
}

/// Maximizes `sum_l^2 / n_l + sum_r^2 / n_r`, which is equivalent to minimizing
/// the summed squared error of both children.
fn best_split(rows: &[Vec<f64>], targets: &[f64], samples: &[usize]) -> Option<SplitCandidate> {
    let n = samples.len();
    let total: f64 = samples.iter().map(|&sample| targets[sample]).sum();
    let first = targets[samples[0]];
    if samples.iter().all(|&sample| targets[sample] == first) {
        return None;
    }

    let baseline = total * total / n as f64;
    let mut best_gain = baseline + 1e-9;
    let mut best: Option<SplitCandidate> = None;
    let n_features = rows[samples[0]].len();

    let mut ordered: Vec<(f64, f64)> = Vec::with_capacity(n);
    for feature in 0..n_features {
        ordered.clear();
        ordered.extend(
            samples
                .iter()
                .map(|&sample| (rows[sample][feature], targets[sample])),
        );
        ordered.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left_sum = 0.0;
        for k in 0..n - 1 {
            left_sum += ordered[k].1;
            if ordered[k].0 == ordered[k + 1].0 {
                continue;
            }
            let left_n = (k + 1) as f64;
            let right_n = (n - k - 1) as f64;
            let right_sum = total - left_sum;
            let gain = left_sum * left_sum / left_n + right_sum * right_sum / right_n;
            if gain > best_gain {
                best_gain = gain;
                best = Some(SplitCandidate {
                    feature,
                    threshold: (ordered[k].0 + ordered[k + 1].0) / 2.0,
                });
            }
        }
    }

    best
}

/// Mean of bootstrap-trained regression trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl RandomForest {
    /// Fits the ensemble over rectangular `rows`.
    pub fn fit(rows: &[Vec<f64>], targets: &[f64], config: &ForestConfig) -> Self {
        let n = rows.len();
        let n_features = rows.first().map(Vec::len).unwrap_or(0);
        if n == 0 {
            return Self {
                trees: Vec::new(),
                n_features,
            };
        }
        let mut rng = StdRng::seed_from_u64(config.seed);

        let trees = (0..config.n_trees.max(1))
            .map(|_| {
                let samples: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit(rows, targets, samples, config.min_samples_split)
            })
            .collect();

        Self { trees, n_features }
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        self.trees.iter().map(|tree| tree.predict(row)).sum::<f64>() / self.trees.len() as f64
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Verifies the node arenas of a deserialized forest.
    pub fn check(&self) -> Result<(), String> {
        self.trees
            .iter()
            .enumerate()
            .try_for_each(|(position, tree)| {
                tree.check(self.n_features)
                    .map_err(|reason| format!("tree {position}: {reason}"))
            })
    }
}

/// Shuffled train/test partition of `0..n`. The test side holds `ceil(n * fraction)`
/// indices unless that would leave nothing to train on, in which case it is empty.
pub fn train_test_split(n: usize, fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let mut n_test = (n as f64 * fraction.clamp(0.0, 1.0)).ceil() as usize;
    if n_test >= n {
        n_test = 0;
    }
    let train = indices.split_off(n_test);
    (train, indices)
}
