use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{N_CLASSES, TextClassifier};

const LEARNING_RATE: f64 = 1.0;
const TOLERANCE: f64 = 1e-4;

/// Multinomial logistic regression with an L2 penalty, fitted by full-batch
/// gradient descent on the mean cross-entropy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// `N_CLASSES x n_features`.
    weights: Array2<f64>,
    bias: Array1<f64>,
}

impl LogisticRegression {
    /// `c` is the inverse regularisation strength; the bias is not penalised.
    /// Stops after `max_iter` steps or once every gradient component is below
    /// the tolerance.
    pub fn fit(
        rows: &[Vec<(usize, f64)>],
        labels: &[usize],
        n_features: usize,
        c: f64,
        max_iter: usize,
    ) -> Self {
        let n = rows.len().max(1) as f64;
        let reg = 1.0 / (c * n);
        let mut model = Self {
            weights: Array2::zeros((N_CLASSES, n_features)),
            bias: Array1::zeros(N_CLASSES),
        };
        let mut grad_w = Array2::<f64>::zeros((N_CLASSES, n_features));
        let mut grad_b = Array1::<f64>::zeros(N_CLASSES);

        let mut steps = 0;
        let mut max_grad = f64::INFINITY;
        while steps < max_iter && max_grad >= TOLERANCE {
            grad_w.fill(0.0);
            grad_b.fill(0.0);

            for (row, &y) in rows.iter().zip(labels) {
                let p = model.scores(row);
                for class in 0..N_CLASSES {
                    let err = p[class] - if class == y { 1.0 } else { 0.0 };
                    grad_b[class] += err;
                    for &(f, x) in row {
                        grad_w[[class, f]] += err * x;
                    }
                }
            }

            max_grad = 0.0;
            for (w, g) in model.weights.iter_mut().zip(grad_w.iter()) {
                let step = g / n + reg * *w;
                *w -= LEARNING_RATE * step;
                max_grad = max_grad.max(step.abs());
            }
            for (b, g) in model.bias.iter_mut().zip(grad_b.iter()) {
                let step = g / n;
                *b -= LEARNING_RATE * step;
                max_grad = max_grad.max(step.abs());
            }
            steps += 1;
        }

        debug!(steps, max_grad, "fitted logistic regression");
        model
    }

    fn logits(&self, row: &[(usize, f64)]) -> Vec<f64> {
        self.weights
            .rows()
            .into_iter()
            .zip(self.bias.iter())
            .map(|(w, b)| {
                b + row
                    .iter()
                    .filter_map(|&(f, x)| w.get(f).map(|wf| wf * x))
                    .sum::<f64>()
            })
            .collect()
    }
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exp: Vec<f64> = logits.iter().map(|z| (z - max).exp()).collect();
    let sum: f64 = exp.iter().sum();
    exp.into_iter().map(|e| e / sum).collect()
}

impl TextClassifier for LogisticRegression {
    /// Class probabilities.
    fn scores(&self, row: &[(usize, f64)]) -> Vec<f64> {
        softmax(&self.logits(row))
    }
}
