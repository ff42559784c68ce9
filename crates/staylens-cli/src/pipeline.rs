//! Pipeline stages over one explicit [`PipelineConfig`].

use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use staylens_ai::artifacts::{TOPICS_FILE, save_topics};
use staylens_ai::topics::topic_counts;
use staylens_ai::{ModelBundle, TopicBundle, TopicModeler, TrainedModels, Trainer};
use staylens_core::{CleanStats, Normalizer, PipelineConfig, ReviewRecord, clean_records};
use staylens_store::{CorpusLayout, MergeReport, merge_tables, read_corpus, read_source_dir, write_corpus};
use tracing::info;

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Read every raw source table and write the merged, deduplicated table.
    pub fn merge(&self, raw_dir: &Path, out: &Path) -> anyhow::Result<MergeReport> {
        let tables = read_source_dir(raw_dir)
            .with_context(|| format!("reading raw sources from {}", raw_dir.display()))?;
        let report = merge_tables(&tables, &self.config.ingest).context("merging source tables")?;
        write_corpus(out, &report.records, CorpusLayout::Cleaned)
            .with_context(|| format!("writing {}", out.display()))?;
        Ok(report)
    }

    /// Harmonize ratings, derive labels and normalize text.
    pub fn clean(&self, input: &Path, out: &Path) -> anyhow::Result<(Vec<ReviewRecord>, CleanStats)> {
        let mut records =
            read_corpus(input).with_context(|| format!("reading {}", input.display()))?;
        let normalizer = Normalizer::new(&self.config.normalizer);
        let stats = clean_records(&mut records, &normalizer, &self.config.ingest);
        write_corpus(out, &records, CorpusLayout::Cleaned)
            .with_context(|| format!("writing {}", out.display()))?;
        Ok((records, stats))
    }

    /// Fit the topic model, assign every review a topic and persist both.
    pub fn topics(
        &self,
        input: &Path,
        out: &Path,
    ) -> anyhow::Result<(Vec<ReviewRecord>, TopicBundle)> {
        let mut records =
            read_corpus(input).with_context(|| format!("reading {}", input.display()))?;
        let texts: Vec<&str> = records.iter().map(|r| r.clean_text.as_str()).collect();
        let (bundle, assignments) = TopicModeler::new(&self.config.topics)
            .fit_assign(&texts)
            .context("fitting topic model")?;
        for (record, topic) in records.iter_mut().zip(&assignments) {
            record.topic_id = Some(*topic);
        }
        info!(
            counts = ?topic_counts(&assignments, bundle.model.n_topics()),
            "assigned topics"
        );

        let bundle_path = self.config.paths.topic_models.join(TOPICS_FILE);
        save_topics(&bundle_path, &bundle)
            .with_context(|| format!("writing {}", bundle_path.display()))?;
        write_corpus(out, &records, CorpusLayout::WithTopics)
            .with_context(|| format!("writing {}", out.display()))?;
        Ok((records, bundle))
    }

    /// Train every configured classifier and persist the model bundle.
    pub fn train(&self, input: &Path) -> anyhow::Result<TrainedModels> {
        let records = read_corpus(input).with_context(|| format!("reading {}", input.display()))?;
        let trained = Trainer::new(&self.config.training)
            .train(&records)
            .context("training sentiment classifiers")?;
        let bundle = ModelBundle::new(&self.config.paths.sentiment_models);
        bundle
            .save(&trained)
            .with_context(|| format!("saving models to {}", bundle.dir().display()))?;
        Ok(trained)
    }

    /// merge → clean → topics → train with the configured paths.
    pub fn run(&self) -> anyhow::Result<TrainedModels> {
        let start = Instant::now();
        let paths = &self.config.paths;
        let merged = self.merge(&paths.raw_dir, &paths.combined)?;
        info!(
            records = merged.records.len(),
            duplicates_dropped = merged.duplicates_dropped,
            "merge complete"
        );
        let (_, stats) = self.clean(&paths.combined, &paths.cleaned)?;
        info!(labelled = stats.labelled, "clean complete");
        self.topics(&paths.cleaned, &paths.with_topics)?;
        let trained = self.train(&paths.cleaned)?;
        info!(elapsed_secs = start.elapsed().as_secs_f64(), "pipeline complete");
        Ok(trained)
    }
}
