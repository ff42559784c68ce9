use rand::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{N_CLASSES, TextClassifier, feature_value};

type ClassCounts = [usize; N_CLASSES];

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    /// Class distribution of the training samples that reached the leaf.
    Leaf { distribution: Vec<f64> },
    /// Samples with `value <= threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Gini decision tree grown to purity, stored as a flat node arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DecisionTree {
    nodes: Vec<Node>,
}

struct SplitChoice {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

fn gini(counts: &ClassCounts, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}

fn class_counts(labels: &[usize], samples: &[usize]) -> ClassCounts {
    let mut counts = [0; N_CLASSES];
    for &i in samples {
        counts[labels[i]] += 1;
    }
    counts
}

impl DecisionTree {
    fn fit(
        rows: &[Vec<(usize, f64)>],
        labels: &[usize],
        samples: Vec<usize>,
        max_features: usize,
        rng: &mut StdRng,
    ) -> Self {
        let mut nodes = vec![Node::Leaf {
            distribution: Vec::new(),
        }];
        let mut pending = vec![(0usize, samples)];

        while let Some((id, samples)) = pending.pop() {
            let counts = class_counts(labels, &samples);
            let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
            let split = if pure || samples.len() < 2 {
                None
            } else {
                best_split(rows, labels, &samples, &counts, max_features, rng)
            };

            match split {
                None => {
                    let n = samples.len().max(1) as f64;
                    nodes[id] = Node::Leaf {
                        distribution: counts.iter().map(|&c| c as f64 / n).collect(),
                    };
                }
                Some(choice) => {
                    let (left, right): (Vec<usize>, Vec<usize>) = samples
                        .iter()
                        .partition(|&&i| feature_value(&rows[i], choice.feature) <= choice.threshold);
                    let left_id = nodes.len();
                    let right_id = left_id + 1;
                    nodes.push(Node::Leaf {
                        distribution: Vec::new(),
                    });
                    nodes.push(Node::Leaf {
                        distribution: Vec::new(),
                    });
                    nodes[id] = Node::Split {
                        feature: choice.feature,
                        threshold: choice.threshold,
                        left: left_id,
                        right: right_id,
                    };
                    pending.push((right_id, right));
                    pending.push((left_id, left));
                }
            }
        }
        Self { nodes }
    }

    fn leaf(&self, row: &[(usize, f64)]) -> &[f64] {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { distribution } => return distribution,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if feature_value(row, *feature) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// Best gini split over `max_features` candidate features.
///
/// Candidates are drawn among features that are non-zero for at least one
/// sample in the node, since any other feature is constant there.
fn best_split(
    rows: &[Vec<(usize, f64)>],
    labels: &[usize],
    samples: &[usize],
    parent: &ClassCounts,
    max_features: usize,
    rng: &mut StdRng,
) -> Option<SplitChoice> {
    let mut present: Vec<usize> = samples
        .iter()
        .flat_map(|&i| rows[i].iter().map(|&(f, _)| f))
        .collect();
    present.sort_unstable();
    present.dedup();

    let n = samples.len();
    let parent_impurity = gini(parent, n);
    let mut best: Option<SplitChoice> = None;

    for &feature in present.choose_multiple(rng, max_features) {
        let mut values: Vec<(f64, usize)> = samples
            .iter()
            .map(|&i| (feature_value(&rows[i], feature), labels[i]))
            .collect();
        values.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left = [0usize; N_CLASSES];
        let mut right = *parent;
        for j in 0..n - 1 {
            let class = values[j].1;
            left[class] += 1;
            right[class] -= 1;
            if values[j].0 >= values[j + 1].0 {
                continue;
            }
            let n_left = j + 1;
            let n_right = n - n_left;
            let impurity =
                (n_left as f64 * gini(&left, n_left) + n_right as f64 * gini(&right, n_right))
                    / n as f64;
            if best.as_ref().is_none_or(|b| impurity < b.impurity) {
                best = Some(SplitChoice {
                    feature,
                    threshold: (values[j].0 + values[j + 1].0) / 2.0,
                    impurity,
                });
            }
        }
    }

    best.filter(|b| b.impurity < parent_impurity - 1e-12)
}

/// Bagged gini trees with square-root feature sampling. Tree `i` draws its
/// bootstrap sample and feature subsets from seed `seed + i`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn fit(
        rows: &[Vec<(usize, f64)>],
        labels: &[usize],
        n_features: usize,
        n_trees: usize,
        seed: u64,
    ) -> Self {
        let n = rows.len();
        let max_features = ((n_features as f64).sqrt() as usize).max(1);

        let trees: Vec<DecisionTree> = (0..n_trees)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
                let sample: Vec<usize> = if n == 0 {
                    Vec::new()
                } else {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                };
                DecisionTree::fit(rows, labels, sample, max_features, &mut rng)
            })
            .collect();

        debug!(
            trees = trees.len(),
            nodes = trees.iter().map(|t| t.nodes.len()).sum::<usize>(),
            "fitted random forest"
        );
        Self { trees }
    }
}

impl TextClassifier for RandomForest {
    /// Mean leaf class distribution across trees.
    fn scores(&self, row: &[(usize, f64)]) -> Vec<f64> {
        let mut mean = vec![0.0; N_CLASSES];
        for tree in &self.trees {
            for (m, p) in mean.iter_mut().zip(tree.leaf(row)) {
                *m += p;
            }
        }
        let n = self.trees.len().max(1) as f64;
        mean.iter_mut().for_each(|m| *m /= n);
        mean
    }
}
