//! Storage layer: raw source ingestion and cleaned corpus artifacts.

mod arrow_ext;
pub mod corpus;
mod error;
pub mod ingest;

pub use corpus::{CorpusLayout, read_corpus, read_parquet, write_corpus};
pub use error::{IngestError, StoreError};
pub use ingest::{MergeReport, SourceTable, merge_tables, read_source_csv, read_source_dir};
