//! Sentiment classifiers over sparse TF-IDF rows.
//!
//! Every classifier predicts one of [`Sentiment::TRAINABLE`]; class index `i`
//! is `Sentiment::TRAINABLE[i]`.

mod forest;
mod logreg;
mod naive_bayes;

use std::fmt;

use serde::{Deserialize, Serialize};
use staylens_core::Sentiment;
use staylens_core::config::TrainConfig;

pub use forest::RandomForest;
pub use logreg::LogisticRegression;
pub use naive_bayes::MultinomialNb;

pub(crate) const N_CLASSES: usize = Sentiment::TRAINABLE.len();

/// Index of the largest value; ties resolve to the lowest index.
pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// A fitted text classifier. Implementations are immutable once fitted and
/// may be shared across threads.
pub trait TextClassifier: Send + Sync {
    /// Class scores for one row, higher is more likely. One per class.
    fn scores(&self, row: &[(usize, f64)]) -> Vec<f64>;

    fn predict_one(&self, row: &[(usize, f64)]) -> Sentiment {
        Sentiment::TRAINABLE[argmax(&self.scores(row))]
    }

    fn predict(&self, rows: &[Vec<(usize, f64)>]) -> Vec<Sentiment> {
        rows.iter().map(|r| self.predict_one(r)).collect()
    }
}

/// The classifier families the trainer can fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Variant {
    #[serde(rename = "logreg")]
    LogReg,
    #[serde(rename = "nb")]
    NaiveBayes,
    #[serde(rename = "rf")]
    RandomForest,
}

impl Variant {
    pub const ALL: [Variant; 3] = [Self::LogReg, Self::NaiveBayes, Self::RandomForest];

    pub fn name(&self) -> &'static str {
        match self {
            Self::LogReg => "logreg",
            Self::NaiveBayes => "nb",
            Self::RandomForest => "rf",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(name))
    }

    /// Fit this variant with the hyperparameters in `config`.
    pub fn fit(
        &self,
        rows: &[Vec<(usize, f64)>],
        labels: &[usize],
        n_features: usize,
        config: &TrainConfig,
    ) -> ClassifierModel {
        match self {
            Self::LogReg => ClassifierModel::LogReg(LogisticRegression::fit(
                rows,
                labels,
                n_features,
                config.logreg_c,
                config.logreg_max_iter,
            )),
            Self::NaiveBayes => ClassifierModel::NaiveBayes(MultinomialNb::fit(
                rows,
                labels,
                n_features,
                config.nb_alpha,
            )),
            Self::RandomForest => ClassifierModel::RandomForest(RandomForest::fit(
                rows,
                labels,
                n_features,
                config.rf_trees,
                config.seed,
            )),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Any fitted classifier, in its persisted form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "variant", content = "model")]
pub enum ClassifierModel {
    #[serde(rename = "logreg")]
    LogReg(LogisticRegression),
    #[serde(rename = "nb")]
    NaiveBayes(MultinomialNb),
    #[serde(rename = "rf")]
    RandomForest(RandomForest),
}

impl ClassifierModel {
    pub fn variant(&self) -> Variant {
        match self {
            Self::LogReg(_) => Variant::LogReg,
            Self::NaiveBayes(_) => Variant::NaiveBayes,
            Self::RandomForest(_) => Variant::RandomForest,
        }
    }
}

impl TextClassifier for ClassifierModel {
    fn scores(&self, row: &[(usize, f64)]) -> Vec<f64> {
        match self {
            Self::LogReg(m) => m.scores(row),
            Self::NaiveBayes(m) => m.scores(row),
            Self::RandomForest(m) => m.scores(row),
        }
    }
}

/// Value of `feature` in a row sorted by feature index.
pub(crate) fn feature_value(row: &[(usize, f64)], feature: usize) -> f64 {
    row.binary_search_by_key(&feature, |&(i, _)| i)
        .map_or(0.0, |pos| row[pos].1)
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Three linearly separable classes over six features: each class owns
    /// two features.
    pub fn separable() -> (Vec<Vec<(usize, f64)>>, Vec<usize>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..30 {
            let class = i % 3;
            let strong = 2 * class;
            let weak = 2 * class + 1;
            let jitter = (i / 3) as f64 * 0.01;
            rows.push(vec![(strong, 0.8 + jitter), (weak, 0.5 - jitter)]);
            labels.push(class);
        }
        (rows, labels)
    }
}
