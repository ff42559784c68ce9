//! Live sentiment prediction from persisted artifacts.

use std::path::Path;
use std::sync::Arc;

use staylens_core::Sentiment;

use crate::artifacts::ModelBundle;
use crate::models::{ClassifierModel, TextClassifier, Variant};
use crate::tfidf::TfidfVectorizer;
use crate::trainer::TrainedModels;
use crate::{ArtifactError, PredictError};

/// Vectorize `text` as-is and classify it. Blank input is rejected.
pub fn predict(
    text: &str,
    vectorizer: &TfidfVectorizer,
    classifier: &dyn TextClassifier,
) -> Result<Sentiment, PredictError> {
    if text.trim().is_empty() {
        return Err(PredictError::EmptyInput);
    }
    Ok(classifier.predict_one(&vectorizer.transform(text)))
}

/// One vectorizer and one classifier, shared read-only.
#[derive(Debug, Clone)]
pub struct Predictor {
    vectorizer: Arc<TfidfVectorizer>,
    classifier: Arc<ClassifierModel>,
}

impl Predictor {
    pub fn new(vectorizer: Arc<TfidfVectorizer>, classifier: Arc<ClassifierModel>) -> Self {
        Self {
            vectorizer,
            classifier,
        }
    }

    /// Load `tfidf.json` and `<variant>.json` from a model directory.
    pub fn load(dir: &Path, variant: &str) -> Result<Self, ArtifactError> {
        let bundle = ModelBundle::new(dir);
        let vectorizer = bundle.load_vectorizer()?;
        let classifier = bundle.load_classifier(variant)?;
        Ok(Self::new(Arc::new(vectorizer), Arc::new(classifier)))
    }

    /// Predictor over a freshly trained variant, if it was fitted.
    pub fn from_trained(trained: &TrainedModels, variant: Variant) -> Option<Self> {
        let model = trained.models.get(&variant)?;
        Some(Self::new(
            Arc::new(trained.vectorizer.clone()),
            Arc::new(model.clone()),
        ))
    }

    pub fn variant(&self) -> Variant {
        self.classifier.variant()
    }

    pub fn predict(&self, text: &str) -> Result<Sentiment, PredictError> {
        predict(text, &self.vectorizer, self.classifier.as_ref())
    }
}
