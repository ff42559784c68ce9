//! Pipeline configuration.
//!
//! One [`PipelineConfig`] is built per run (defaults, optionally overlaid from
//! a JSON file) and handed to every stage. No stage reads ambient state.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::rating::RatingScale;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Top-level configuration shared by all stages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub paths: PathConfig,
    pub ingest: IngestConfig,
    pub normalizer: NormalizerConfig,
    pub topics: TopicConfig,
    pub training: TrainConfig,
}

/// File locations, mirroring the on-disk layout of the original pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Directory of raw per-source CSV files.
    pub raw_dir: PathBuf,
    /// Merged (uncleaned) review table.
    pub combined: PathBuf,
    /// Cleaned corpus artifact.
    pub cleaned: PathBuf,
    /// Cleaned corpus plus `lda_topic`.
    pub with_topics: PathBuf,
    /// Sentiment vectorizer and classifiers.
    pub sentiment_models: PathBuf,
    /// Topic model bundle directory.
    pub topic_models: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("datasets/raw/reviews"),
            combined: PathBuf::from("datasets/clean/reviews_combined.csv"),
            cleaned: PathBuf::from("datasets/clean/reviews_cleaned.csv"),
            with_topics: PathBuf::from("datasets/clean/reviews_with_topics.csv"),
            sentiment_models: PathBuf::from("models/sentiment"),
            topic_models: PathBuf::from("models/topics"),
        }
    }
}

impl PathConfig {
    /// Re-root every relative path under `base`.
    pub fn rebase(&mut self, base: &Path) {
        for p in [
            &mut self.raw_dir,
            &mut self.combined,
            &mut self.cleaned,
            &mut self.with_topics,
            &mut self.sentiment_models,
            &mut self.topic_models,
        ] {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }
    }
}

/// Ingestion settings: the native rating scale per source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Source name (lowercase) → native rating scale.
    pub scales: BTreeMap<String, RatingScale>,
    /// Scale for sources not listed in `scales`.
    pub default_scale: RatingScale,
}

impl Default for IngestConfig {
    fn default() -> Self {
        let mut scales = BTreeMap::new();
        scales.insert("booking".to_string(), RatingScale::TenPoint);
        scales.insert("tripadvisor".to_string(), RatingScale::BubbleTenths);
        Self {
            scales,
            default_scale: RatingScale::FivePoint,
        }
    }
}

impl IngestConfig {
    /// Declared scale for a source key.
    pub fn scale_for(&self, source_key: &str) -> RatingScale {
        self.scales
            .get(source_key)
            .copied()
            .unwrap_or(self.default_scale)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Tokens shorter than this many characters are dropped.
    pub min_token_len: usize,
    /// Stopwords added to the English list.
    pub extra_stopwords: Vec<String>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            min_token_len: 3,
            extra_stopwords: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicConfig {
    /// Number of latent topics `K`.
    pub n_topics: usize,
    /// Vocabulary bound for the document-term matrix.
    pub max_features: usize,
    /// Gibbs sweeps over the corpus.
    pub iterations: usize,
    /// Keywords kept per topic.
    pub top_n: usize,
    pub seed: u64,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            n_topics: 8,
            max_features: 5000,
            iterations: 200,
            top_n: 15,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Fraction of each class held out for evaluation.
    pub test_fraction: f64,
    /// TF-IDF vocabulary bound.
    pub max_features: usize,
    pub seed: u64,
    /// Classifier variants to fit, by name (`logreg`, `nb`, `rf`).
    pub variants: Vec<String>,
    pub logreg_max_iter: usize,
    /// Inverse L2 regularisation strength.
    pub logreg_c: f64,
    pub nb_alpha: f64,
    pub rf_trees: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            max_features: 15_000,
            seed: 42,
            variants: vec!["logreg".into(), "nb".into(), "rf".into()],
            logreg_max_iter: 1000,
            logreg_c: 1.0,
            nb_alpha: 1.0,
            rf_trees: 200,
        }
    }
}

impl PipelineConfig {
    /// Load a config file, filling unspecified fields with defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        info!(path = %path.display(), "loaded pipeline config");
        Ok(config)
    }

    /// Reject values no stage can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.training;
        if !(t.test_fraction > 0.0 && t.test_fraction < 1.0) {
            return Err(ConfigError::Invalid {
                field: "training.test_fraction",
                reason: format!("{} is not in (0, 1)", t.test_fraction),
            });
        }
        if t.max_features == 0 {
            return Err(ConfigError::Invalid {
                field: "training.max_features",
                reason: "must be positive".into(),
            });
        }
        if t.variants.is_empty() {
            return Err(ConfigError::Invalid {
                field: "training.variants",
                reason: "at least one classifier variant is required".into(),
            });
        }
        if self.topics.n_topics == 0 {
            return Err(ConfigError::Invalid {
                field: "topics.n_topics",
                reason: "must be positive".into(),
            });
        }
        if self.topics.max_features == 0 {
            return Err(ConfigError::Invalid {
                field: "topics.max_features",
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }
}
