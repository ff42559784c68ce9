//! Sentiment classifier training: split, vectorize, fit every variant,
//! evaluate.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use rayon::prelude::*;
use staylens_core::config::TrainConfig;
use staylens_core::{ReviewRecord, Sentiment};
use tracing::{info, warn};

use crate::TrainError;
use crate::metrics::ClassificationReport;
use crate::models::{ClassifierModel, TextClassifier, Variant};
use crate::split::stratified_split;
use crate::tfidf::TfidfVectorizer;

/// Output of one training run.
#[derive(Debug, Clone)]
pub struct TrainedModels {
    /// Fitted on the training partition only.
    pub vectorizer: TfidfVectorizer,
    pub models: BTreeMap<Variant, ClassifierModel>,
    /// Evaluation-partition report per variant.
    pub reports: BTreeMap<Variant, ClassificationReport>,
    pub train_size: usize,
    pub test_size: usize,
}

#[derive(Debug, Clone)]
pub struct Trainer {
    config: TrainConfig,
}

impl Trainer {
    pub fn new(config: &TrainConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn variants(&self) -> Result<BTreeSet<Variant>, TrainError> {
        let c = &self.config;
        if c.max_features == 0 {
            return Err(TrainError::InvalidConfig("max_features must be positive".into()));
        }
        if !(c.logreg_c > 0.0) {
            return Err(TrainError::InvalidConfig("logreg_c must be positive".into()));
        }
        if !(c.nb_alpha > 0.0) {
            return Err(TrainError::InvalidConfig("nb_alpha must be positive".into()));
        }
        if c.rf_trees == 0 {
            return Err(TrainError::InvalidConfig("rf_trees must be positive".into()));
        }
        let variants = c
            .variants
            .iter()
            .map(|name| {
                Variant::parse(name)
                    .ok_or_else(|| TrainError::InvalidConfig(format!("unknown variant {name:?}")))
            })
            .collect::<Result<BTreeSet<_>, _>>()?;
        if variants.is_empty() {
            return Err(TrainError::InvalidConfig("no classifier variants configured".into()));
        }
        Ok(variants)
    }

    /// Train on the labelled records. `Unknown` records are skipped.
    pub fn train(&self, records: &[ReviewRecord]) -> Result<TrainedModels, TrainError> {
        let (texts, labels): (Vec<&str>, Vec<Sentiment>) = records
            .iter()
            .filter(|r| r.is_trainable())
            .map(|r| (r.clean_text.as_str(), r.sentiment))
            .unzip();
        let skipped = records.len() - texts.len();
        if skipped > 0 {
            warn!(skipped, "records without a known sentiment left out of training");
        }
        self.train_examples(&texts, &labels)
    }

    /// Train on parallel slices of text and label.
    pub fn train_examples(
        &self,
        texts: &[&str],
        labels: &[Sentiment],
    ) -> Result<TrainedModels, TrainError> {
        if texts.len() != labels.len() {
            return Err(TrainError::InvalidConfig(format!(
                "{} texts but {} labels",
                texts.len(),
                labels.len()
            )));
        }
        let variants = self.variants()?;
        let split = stratified_split(labels, self.config.test_fraction, self.config.seed)?;

        let train_texts: Vec<&str> = split.train.iter().map(|&i| texts[i]).collect();
        let test_texts: Vec<&str> = split.test.iter().map(|&i| texts[i]).collect();
        let y_train: Vec<usize> = split
            .train
            .iter()
            .filter_map(|&i| labels[i].class_index())
            .collect();
        let y_test: Vec<Sentiment> = split.test.iter().map(|&i| labels[i]).collect();

        let vectorizer = TfidfVectorizer::fit(&train_texts, self.config.max_features);
        if vectorizer.is_empty() {
            return Err(TrainError::EmptyVocabulary);
        }
        let x_train = vectorizer.transform_all(&train_texts);
        let x_test = vectorizer.transform_all(&test_texts);
        info!(
            train = x_train.len(),
            test = x_test.len(),
            features = vectorizer.n_features(),
            "vectorized training data"
        );

        let fitted: Vec<(Variant, ClassifierModel, ClassificationReport)> = variants
            .par_iter()
            .map(|&variant| {
                let start = Instant::now();
                let model = variant.fit(&x_train, &y_train, vectorizer.n_features(), &self.config);
                let predicted = model.predict(&x_test);
                let report = ClassificationReport::compute(variant.name(), &y_test, &predicted);
                info!(
                    %variant,
                    accuracy = report.accuracy,
                    macro_f1 = report.macro_avg.f1,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "fitted classifier"
                );
                (variant, model, report)
            })
            .collect();

        let mut models = BTreeMap::new();
        let mut reports = BTreeMap::new();
        for (variant, model, report) in fitted {
            models.insert(variant, model);
            reports.insert(variant, report);
        }

        Ok(TrainedModels {
            vectorizer,
            models,
            reports,
            train_size: split.train.len(),
            test_size: split.test.len(),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TrainConfig {
        TrainConfig {
            rf_trees: 15,
            ..Default::default()
        }
    }

    #[test]
    fn trains_every_variant_with_full_reports() {
        let trained = Trainer::new(&config()).train(&fixtures::records()).unwrap();
        assert_eq!(trained.train_size, 24);
        assert_eq!(trained.test_size, 6);
        assert_eq!(
            trained.models.keys().copied().collect::<Vec<_>>(),
            Variant::ALL.to_vec()
        );
        for report in trained.reports.values() {
            assert_eq!(report.labels(), Sentiment::TRAINABLE.to_vec());
            assert_eq!(report.support, 6);
        }
        assert_eq!(trained.reports[&Variant::LogReg].accuracy, 1.0);
        assert_eq!(trained.reports[&Variant::NaiveBayes].accuracy, 1.0);
    }

    #[test]
    fn missing_class_is_named() {
        let records: Vec<_> = fixtures::records()
            .into_iter()
            .filter(|r| r.sentiment != Sentiment::Neutral)
            .collect();
        let err = Trainer::new(&config()).train(&records).unwrap_err();
        assert!(matches!(
            err,
            TrainError::InsufficientData {
                class: Sentiment::Neutral,
                count: 0,
                required: 2
            }
        ));
    }

    #[test]
    fn unknown_variant_rejected() {
        let cfg = TrainConfig {
            variants: vec!["logreg".into(), "svm".into()],
            ..config()
        };
        assert!(matches!(
            Trainer::new(&cfg).train(&fixtures::records()),
            Err(TrainError::InvalidConfig(_))
        ));
    }

    #[test]
    fn subset_of_variants() {
        let cfg = TrainConfig {
            variants: vec!["nb".into(), "nb".into()],
            ..config()
        };
        let trained = Trainer::new(&cfg).train(&fixtures::records()).unwrap();
        assert_eq!(trained.models.len(), 1);
        assert!(trained.models.contains_key(&Variant::NaiveBayes));
    }

    #[test]
    fn mismatched_texts_and_labels_rejected() {
        let texts = ["clean room", "dirty room"];
        let labels = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];
        assert!(matches!(
            Trainer::new(&config()).train_examples(&texts, &labels),
            Err(TrainError::InvalidConfig(_))
        ));
    }

    #[test]
    fn texts_without_tokens_have_empty_vocabulary() {
        let texts = ["a", "b", "c", "d", "e", "f"];
        let labels = [
            Sentiment::Positive,
            Sentiment::Positive,
            Sentiment::Neutral,
            Sentiment::Neutral,
            Sentiment::Negative,
            Sentiment::Negative,
        ];
        assert!(matches!(
            Trainer::new(&config()).train_examples(&texts, &labels),
            Err(TrainError::EmptyVocabulary)
        ));
    }
}
