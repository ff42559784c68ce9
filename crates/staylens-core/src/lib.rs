pub mod clean;
pub mod config;
pub mod filter;
pub mod lemma;
pub mod normalize;
pub mod rating;
pub mod record;
pub mod schema;
pub mod sentiment;
pub mod summary;

pub use clean::{CleanStats, clean_record, clean_records};
pub use config::{ConfigError, PipelineConfig};
pub use filter::ReviewFilter;
pub use normalize::{Normalizer, english_stopwords};
pub use rating::{RatingScale, harmonize, round_display};
pub use record::{ReviewRecord, Source};
pub use schema::reviews;
pub use sentiment::{Sentiment, derive_sentiment, label_from_rating};
pub use summary::CorpusSummary;
