mod display;
mod pipeline;

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use staylens_ai::topics::topic_counts;
use staylens_ai::{Predictor, top_terms};
use staylens_core::{CorpusSummary, PipelineConfig, ReviewFilter, Sentiment, english_stopwords};
use staylens_store::read_corpus;
use tracing::Level;

use crate::pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "staylens", version)]
#[command(about = "Hotel review cleaning, topic discovery and sentiment models")]
struct Cli {
    /// Pipeline config file (JSON). Defaults apply to anything it omits.
    #[arg(long, env = "STAYLENS_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Base directory for relative dataset and model paths.
    #[arg(long, env = "STAYLENS_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Model directory; holds `sentiment/` and `topics/`.
    #[arg(long, env = "STAYLENS_MODEL_DIR", global = true)]
    model_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Merge raw per-source CSV files into one deduplicated table.
    Merge {
        /// Directory of raw CSV files.
        #[arg(long)]
        raw_dir: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Harmonize ratings, derive sentiment labels and normalize text.
    Clean {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Fit the LDA topic model and tag every review with its topic.
    Topics {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
        /// Number of topics.
        #[arg(short = 'k', long)]
        topics: Option<usize>,
    },
    /// Train and evaluate the sentiment classifiers.
    Train {
        #[arg(long)]
        input: Option<PathBuf>,
        /// Variants to fit (logreg, nb, rf).
        #[arg(long, value_delimiter = ',')]
        variants: Vec<String>,
    },
    /// Predict the sentiment of a review text.
    Predict {
        /// Classifier variant.
        #[arg(short, long, default_value = "logreg")]
        model: String,
        /// Review text.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Summarise a corpus artifact, optionally filtered.
    Summary {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        hotel: Option<String>,
        #[arg(long)]
        sentiment: Option<String>,
        #[arg(long)]
        topic: Option<usize>,
        /// Show this many top TF-IDF terms per sentiment.
        #[arg(long)]
        terms: Option<usize>,
    },
    /// Run merge, clean, topics and train in sequence.
    Run,
}

/// Build the one config every stage receives.
fn load_config(cli: &Cli) -> anyhow::Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(base) = &cli.data_dir {
        config.paths.rebase(base);
    }
    if let Some(models) = &cli.model_dir {
        config.paths.sentiment_models = models.join("sentiment");
        config.paths.topic_models = models.join("topics");
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = cli.log_level.parse::<Level>().unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("staylens v{}", env!("CARGO_PKG_VERSION"));

    let mut config = load_config(&cli)?;

    match cli.command {
        Command::Merge { raw_dir, out } => {
            let raw_dir = raw_dir.unwrap_or_else(|| config.paths.raw_dir.clone());
            let out = out.unwrap_or_else(|| config.paths.combined.clone());
            let report = Pipeline::new(config).merge(&raw_dir, &out)?;
            println!(
                "Merged {} rows into {} reviews ({} duplicates dropped) -> {}",
                report.rows_read,
                report.records.len(),
                report.duplicates_dropped,
                out.display()
            );
        }
        Command::Clean { input, out } => {
            let input = input.unwrap_or_else(|| config.paths.combined.clone());
            let out = out.unwrap_or_else(|| config.paths.cleaned.clone());
            let (_, stats) = Pipeline::new(config).clean(&input, &out)?;
            println!(
                "Cleaned {} reviews: {} rated, {} labelled, {} empty -> {}",
                stats.records,
                stats.rated,
                stats.labelled,
                stats.empty_text,
                out.display()
            );
        }
        Command::Topics { input, out, topics } => {
            if let Some(k) = topics {
                config.topics.n_topics = k;
            }
            config.validate().context("invalid topic settings")?;
            let input = input.unwrap_or_else(|| config.paths.cleaned.clone());
            let out = out.unwrap_or_else(|| config.paths.with_topics.clone());
            let (records, bundle) = Pipeline::new(config).topics(&input, &out)?;
            let assigned: Vec<usize> = records.iter().filter_map(|r| r.topic_id).collect();
            display::print_topics(&bundle, &topic_counts(&assigned, bundle.model.n_topics()));
            println!("Saved with topics to {}", out.display());
        }
        Command::Train { input, variants } => {
            if !variants.is_empty() {
                config.training.variants = variants;
            }
            let input = input.unwrap_or_else(|| config.paths.cleaned.clone());
            let trained = Pipeline::new(config).train(&input)?;
            display::print_reports(&trained.reports);
        }
        Command::Predict { model, text } => {
            let text = text.join(" ");
            let predictor = Predictor::load(&config.paths.sentiment_models, &model)
                .with_context(|| {
                    format!("loading models from {}", config.paths.sentiment_models.display())
                })?;
            let label = predictor.predict(&text)?;
            println!("Predicted sentiment: {}", label.as_str().to_uppercase());
        }
        Command::Summary {
            input,
            hotel,
            sentiment,
            topic,
            terms,
        } => {
            let input = input.unwrap_or_else(|| {
                if config.paths.with_topics.is_file() {
                    config.paths.with_topics.clone()
                } else {
                    config.paths.cleaned.clone()
                }
            });
            let records =
                read_corpus(&input).with_context(|| format!("reading {}", input.display()))?;
            let filter = ReviewFilter {
                hotel,
                sentiment: sentiment.map(|s| Sentiment::parse(&s)),
                topic,
            };
            let view: Vec<_> = filter.apply(&records).collect();
            display::print_summary(&CorpusSummary::from_records(view.iter().copied()));

            if let Some(n) = terms {
                let stopwords: BTreeSet<String> = english_stopwords().into_iter().collect();
                for label in Sentiment::TRAINABLE {
                    let texts: Vec<&str> = view
                        .iter()
                        .filter(|r| r.sentiment == label)
                        .map(|r| r.clean_text.as_str())
                        .collect();
                    println!();
                    let ranked = top_terms(&texts, n, stopwords.clone());
                    display::print_top_terms(label, &ranked);
                }
            }
        }
        Command::Run => {
            let pipeline = Pipeline::new(config);
            tracing::info!(
                raw_dir = %pipeline.config().paths.raw_dir.display(),
                "running full pipeline"
            );
            let trained = pipeline.run()?;
            display::print_reports(&trained.reports);
        }
    }

    Ok(())
}
