//! Ingestion merger: per-source raw review tables into one deduplicated table.

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use arrow::array::Array;
use arrow::record_batch::RecordBatch;
use rayon::prelude::*;
use staylens_core::config::IngestConfig;
use staylens_core::{ReviewRecord, Sentiment, Source, reviews};
use tracing::{debug, info, warn};

use crate::IngestError;
use crate::arrow_ext::{find_column, get_string, get_text, read_csv_as_strings};

/// One raw table as read from a scraper output file.
#[derive(Debug, Clone)]
pub struct SourceTable {
    /// File name the table was read from.
    pub provenance: String,
    pub batches: Vec<RecordBatch>,
}

impl SourceTable {
    pub fn new(provenance: impl Into<String>, batches: Vec<RecordBatch>) -> Self {
        Self {
            provenance: provenance.into(),
            batches,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }
}

/// Result of merging source tables.
#[derive(Debug, Clone)]
pub struct MergeReport {
    pub records: Vec<ReviewRecord>,
    pub rows_read: usize,
    pub duplicates_dropped: usize,
}

/// Read one headed CSV file with every column as a nullable string.
pub fn read_source_csv(path: &Path) -> Result<SourceTable, IngestError> {
    let provenance = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let file = File::open(path).map_err(|e| IngestError::Unparseable {
        file: provenance.clone(),
        reason: e.to_string(),
    })?;
    let batches = read_csv_as_strings(file).map_err(|e| IngestError::Unparseable {
        file: provenance.clone(),
        reason: e.to_string(),
    })?;

    let table = SourceTable::new(provenance, batches);
    debug!(file = %table.provenance, rows = table.num_rows(), "read source table");
    Ok(table)
}

/// Read every `*.csv` file in `dir`, ordered by file name.
pub fn read_source_dir(dir: &Path) -> Result<Vec<SourceTable>, IngestError> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    if paths.is_empty() {
        return Err(IngestError::NoSources);
    }
    paths.sort();

    let tables = paths
        .par_iter()
        .map(|p| read_source_csv(p))
        .collect::<Result<Vec<_>, _>>()?;
    info!(dir = %dir.display(), files = tables.len(), "read source directory");
    Ok(tables)
}

/// Union all tables into review records, dropping (`body`, `hotel_id`)
/// duplicates. The first occurrence in table order is kept.
pub fn merge_tables(
    tables: &[SourceTable],
    config: &IngestConfig,
) -> Result<MergeReport, IngestError> {
    if tables.is_empty() {
        return Err(IngestError::NoSources);
    }

    let mut records = Vec::new();
    let mut seen: HashSet<(String, Option<String>)> = HashSet::new();
    let mut rows_read = 0usize;
    let mut duplicates_dropped = 0usize;

    for table in tables {
        let rows = table_records(table);
        if !rows.iter().any(has_content) {
            return Err(IngestError::EmptySource {
                file: table.provenance.clone(),
            });
        }
        rows_read += rows.len();

        let mut sources = HashSet::new();
        let mut kept = 0usize;
        for record in rows {
            let key = (record.body.clone(), record.hotel_id.clone());
            if !seen.insert(key) {
                duplicates_dropped += 1;
                continue;
            }
            sources.insert(record.source.key().to_string());
            records.push(record);
            kept += 1;
        }
        for source in &sources {
            if !config.scales.contains_key(source) {
                warn!(
                    file = %table.provenance,
                    source = %source,
                    scale = ?config.default_scale,
                    "no rating scale declared for source, using default"
                );
            }
        }
        debug!(file = %table.provenance, kept, "merged source table");
    }

    if duplicates_dropped > 0 {
        warn!(duplicates_dropped, "dropped duplicate reviews");
    }
    info!(
        tables = tables.len(),
        rows_read,
        records = records.len(),
        "merged source tables"
    );
    Ok(MergeReport {
        records,
        rows_read,
        duplicates_dropped,
    })
}

fn has_content(record: &ReviewRecord) -> bool {
    !record.title.trim().is_empty()
        || !record.body.trim().is_empty()
        || record.raw_rating.is_some()
}

fn column(batch: &RecordBatch, idx: Option<usize>) -> Option<&dyn Array> {
    idx.map(|i| batch.column(i).as_ref())
}

/// Map every row of a table onto the review record layout.
fn table_records(table: &SourceTable) -> Vec<ReviewRecord> {
    let fallback_source = Source::from_provenance(&table.provenance);
    let mut out = Vec::with_capacity(table.num_rows());

    for batch in &table.batches {
        let hotel = find_column(batch, reviews::HOTEL_ALIASES);
        let title = find_column(batch, reviews::TITLE_ALIASES);
        let body = find_column(batch, reviews::BODY_ALIASES);
        let rating = find_column(batch, reviews::RATING_ALIASES);
        let sentiment = find_column(batch, reviews::SENTIMENT_ALIASES);
        let source = find_column(batch, &[reviews::SOURCE]);

        for row in 0..batch.num_rows() {
            let src = column(batch, source)
                .and_then(|c| get_string(c, row))
                .and_then(|s| Source::parse(&s))
                .unwrap_or_else(|| fallback_source.clone());
            let mut record = ReviewRecord::raw(src, table.provenance.clone());
            record.hotel_id = column(batch, hotel).and_then(|c| get_text(c, row));
            record.title = column(batch, title)
                .and_then(|c| get_string(c, row))
                .unwrap_or_default();
            record.body = column(batch, body)
                .and_then(|c| get_string(c, row))
                .unwrap_or_default();
            record.raw_rating = column(batch, rating).and_then(|c| get_text(c, row));
            record.sentiment = column(batch, sentiment)
                .and_then(|c| get_string(c, row))
                .map(|s| Sentiment::parse(&s))
                .unwrap_or(Sentiment::Unknown);
            out.push(record);
        }
    }
    out
}
