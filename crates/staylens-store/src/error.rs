use thiserror::Error;

/// Failures while reading and merging raw source tables.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("no source tables found")]
    NoSources,

    #[error("source table {file} has no usable rows")]
    EmptySource { file: String },

    #[error("cannot parse source table {file}: {reason}")]
    Unparseable { file: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

/// Failures reading or writing corpus artifacts.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("corpus is missing column {0}")]
    MissingColumn(&'static str),

    #[error("{0}")]
    Other(String),
}
