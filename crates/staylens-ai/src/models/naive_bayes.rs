use serde::{Deserialize, Serialize};

use super::{N_CLASSES, TextClassifier};

/// Multinomial naive Bayes over term weights with additive smoothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultinomialNb {
    class_log_prior: Vec<f64>,
    /// One row of smoothed log term probabilities per class.
    feature_log_prob: Vec<Vec<f64>>,
}

impl MultinomialNb {
    pub fn fit(rows: &[Vec<(usize, f64)>], labels: &[usize], n_features: usize, alpha: f64) -> Self {
        let mut class_count = [0usize; N_CLASSES];
        let mut feature_count = vec![vec![0.0; n_features]; N_CLASSES];
        for (row, &y) in rows.iter().zip(labels) {
            class_count[y] += 1;
            for &(f, x) in row {
                feature_count[y][f] += x;
            }
        }

        let n = rows.len() as f64;
        // A class never seen in training can never win.
        let class_log_prior = class_count
            .iter()
            .map(|&c| if c == 0 { f64::MIN } else { (c as f64 / n).ln() })
            .collect();
        let feature_log_prob = feature_count
            .iter()
            .map(|counts| {
                let total: f64 = counts.iter().sum::<f64>() + alpha * n_features as f64;
                counts.iter().map(|&c| ((c + alpha) / total).ln()).collect()
            })
            .collect();

        Self {
            class_log_prior,
            feature_log_prob,
        }
    }
}

impl TextClassifier for MultinomialNb {
    /// Joint log-likelihood per class.
    fn scores(&self, row: &[(usize, f64)]) -> Vec<f64> {
        self.class_log_prior
            .iter()
            .zip(&self.feature_log_prob)
            .map(|(prior, flp)| {
                prior
                    + row
                        .iter()
                        .filter_map(|&(f, x)| flp.get(f).map(|p| p * x))
                        .sum::<f64>()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;

    #[test]
    fn smoothed_probabilities_normalise() {
        let (rows, labels) = fixtures::separable();
        let nb = MultinomialNb::fit(&rows, &labels, 6, 1.0);
        for flp in &nb.feature_log_prob {
            let total: f64 = flp.iter().map(|p| p.exp()).sum();
            assert!((total - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn prior_follows_class_frequency() {
        let rows = vec![vec![(0, 1.0)], vec![(0, 1.0)], vec![(1, 1.0)], vec![(2, 1.0)]];
        let nb = MultinomialNb::fit(&rows, &[0, 0, 1, 2], 3, 1.0);
        assert!((nb.class_log_prior[0] - 0.5f64.ln()).abs() < 1e-12);
        // With no evidence the majority class wins.
        assert_eq!(nb.predict_one(&[]), staylens_core::Sentiment::Negative);
    }

    #[test]
    fn absent_class_never_predicted() {
        let rows = vec![vec![(0, 1.0)], vec![(1, 1.0)]];
        let nb = MultinomialNb::fit(&rows, &[0, 2], 2, 1.0);
        assert!(nb.class_log_prior[1].is_finite());
        assert_ne!(nb.predict_one(&[]), staylens_core::Sentiment::Neutral);
    }
}
