//! JSON persistence for fitted vectorizers, classifiers, reports and topic
//! bundles.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::ArtifactError;
use crate::metrics::ClassificationReport;
use crate::models::{ClassifierModel, Variant};
use crate::tfidf::TfidfVectorizer;
use crate::topics::TopicBundle;
use crate::trainer::TrainedModels;

pub const TFIDF_FILE: &str = "tfidf.json";
pub const REPORT_FILE: &str = "report.json";
pub const TOPICS_FILE: &str = "lda_topics.json";

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ArtifactError + '_ {
    move |source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn json_err(path: &Path) -> impl FnOnce(serde_json::Error) -> ArtifactError + '_ {
    move |source| ArtifactError::Json {
        path: path.to_path_buf(),
        source,
    }
}

/// Write `value` as JSON, creating parent directories.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ArtifactError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    let file = File::create(path).map_err(io_err(path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value).map_err(json_err(path))?;
    writer.flush().map_err(io_err(path))
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let file = File::open(path).map_err(io_err(path))?;
    serde_json::from_reader(BufReader::new(file)).map_err(json_err(path))
}

/// A sentiment model directory: `tfidf.json`, one `<variant>.json` per
/// classifier and `report.json`.
#[derive(Debug, Clone)]
pub struct ModelBundle {
    dir: PathBuf,
}

impl ModelBundle {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn model_path(&self, variant: Variant) -> PathBuf {
        self.dir.join(format!("{}.json", variant.name()))
    }

    pub fn save(&self, trained: &TrainedModels) -> Result<(), ArtifactError> {
        save_json(&self.dir.join(TFIDF_FILE), &trained.vectorizer)?;
        for (variant, model) in &trained.models {
            save_json(&self.model_path(*variant), model)?;
        }
        save_json(&self.dir.join(REPORT_FILE), &trained.reports)?;
        info!(
            dir = %self.dir.display(),
            models = trained.models.len(),
            "saved sentiment models"
        );
        Ok(())
    }

    pub fn load_vectorizer(&self) -> Result<TfidfVectorizer, ArtifactError> {
        load_json(&self.dir.join(TFIDF_FILE))
    }

    /// Load a classifier by variant name (`logreg`, `nb`, `rf`).
    pub fn load_classifier(&self, name: &str) -> Result<ClassifierModel, ArtifactError> {
        let variant =
            Variant::parse(name).ok_or_else(|| ArtifactError::UnknownVariant(name.to_string()))?;
        let model: ClassifierModel = load_json(&self.model_path(variant))?;
        if model.variant() != variant {
            return Err(ArtifactError::UnknownVariant(format!(
                "{} holds a {} model",
                self.model_path(variant).display(),
                model.variant()
            )));
        }
        Ok(model)
    }

    pub fn load_reports(&self) -> Result<BTreeMap<Variant, ClassificationReport>, ArtifactError> {
        load_json(&self.dir.join(REPORT_FILE))
    }

    /// Variants with a model file present.
    pub fn available(&self) -> Vec<Variant> {
        Variant::ALL
            .into_iter()
            .filter(|v| self.model_path(*v).is_file())
            .collect()
    }
}

pub fn save_topics(path: &Path, bundle: &TopicBundle) -> Result<(), ArtifactError> {
    save_json(path, bundle)?;
    info!(path = %path.display(), topics = bundle.keywords.len(), "saved topic bundle");
    Ok(())
}

pub fn load_topics(path: &Path) -> Result<TopicBundle, ArtifactError> {
    load_json(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Trainer;
    use crate::trainer::fixtures;
    use staylens_core::config::TrainConfig;
    use tempfile::TempDir;

    fn trained() -> TrainedModels {
        let config = TrainConfig {
            rf_trees: 5,
            ..Default::default()
        };
        Trainer::new(&config).train(&fixtures::records()).unwrap()
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn failed_final_write_is_reported() {
        // /dev/full accepts open and buffered writes but fails on flush.
        let err = save_json(Path::new("/dev/full"), &vec![1u32, 2, 3]).unwrap_err();
        assert!(matches!(err, ArtifactError::Io { path, .. } if path == Path::new("/dev/full")));
    }

    #[test]
    fn bundle_roundtrip() {
        let dir = TempDir::new().unwrap();
        let bundle = ModelBundle::new(dir.path().join("models/sentiment"));
        let trained = trained();
        bundle.save(&trained).unwrap();

        for name in ["tfidf.json", "logreg.json", "nb.json", "rf.json", "report.json"] {
            assert!(bundle.dir().join(name).is_file(), "{name}");
        }
        assert_eq!(bundle.available(), Variant::ALL.to_vec());
        assert_eq!(bundle.load_vectorizer().unwrap(), trained.vectorizer);
        assert_eq!(bundle.load_reports().unwrap(), trained.reports);

        let nb = bundle.load_classifier("nb").unwrap();
        assert_eq!(nb.variant(), Variant::NaiveBayes);
    }

    #[test]
    fn unknown_and_missing_variants() {
        let dir = TempDir::new().unwrap();
        let bundle = ModelBundle::new(dir.path());
        assert!(matches!(
            bundle.load_classifier("svm"),
            Err(ArtifactError::UnknownVariant(_))
        ));
        assert!(matches!(
            bundle.load_classifier("rf"),
            Err(ArtifactError::Io { .. })
        ));
    }

    #[test]
    fn corrupt_file_is_json_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(TFIDF_FILE), "{not json").unwrap();
        assert!(matches!(
            ModelBundle::new(dir.path()).load_vectorizer(),
            Err(ArtifactError::Json { .. })
        ));
    }
}
