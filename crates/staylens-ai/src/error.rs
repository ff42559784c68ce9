use std::path::PathBuf;

use staylens_core::Sentiment;
use thiserror::Error;

/// Failures fitting the sentiment classifiers.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("class {class} has {count} labelled reviews, at least {required} are required")]
    InsufficientData {
        class: Sentiment,
        count: usize,
        required: usize,
    },

    #[error("invalid training config: {0}")]
    InvalidConfig(String),

    #[error("training texts produced an empty vocabulary")]
    EmptyVocabulary,
}

#[derive(Debug, Error)]
pub enum TopicError {
    #[error("number of topics must be positive")]
    InvalidTopicCount,

    #[error("texts produced an empty vocabulary after stopword removal")]
    EmptyVocabulary,
}

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("input text is empty")]
    EmptyInput,
}

/// Failures persisting or loading model artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid artifact {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unknown classifier variant: {0}")]
    UnknownVariant(String),
}
