pub mod artifacts;
pub mod count;
mod error;
pub mod metrics;
pub mod models;
pub mod predictor;
pub mod split;
pub mod tfidf;
pub mod topics;
pub mod trainer;

pub use artifacts::ModelBundle;
pub use count::{CountVectorizer, Vocabulary};
pub use error::{ArtifactError, PredictError, TopicError, TrainError};
pub use metrics::{ClassificationReport, ConfusionMatrix};
pub use models::{ClassifierModel, TextClassifier, Variant};
pub use predictor::{Predictor, predict};
pub use tfidf::{SparseVec, TfidfVectorizer, top_terms};
pub use topics::{Lda, TopicBundle, TopicModeler};
pub use trainer::{TrainedModels, Trainer};
