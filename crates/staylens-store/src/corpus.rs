//! Cleaned and topic-augmented corpus artifacts.
//!
//! Files ending in `.parquet` are written and read as Parquet, anything else
//! as UTF-8 CSV with a header row.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::csv::WriterBuilder;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use staylens_core::{ReviewRecord, Sentiment, Source, reviews, round_display};
use tracing::info;

use crate::StoreError;
use crate::arrow_ext::{find_column, get_f64, get_index, get_string, get_text, read_csv_as_strings};

/// Column layout of a corpus artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusLayout {
    /// The ten cleaned-corpus columns.
    Cleaned,
    /// Cleaned columns plus `lda_topic`.
    WithTopics,
}

fn is_parquet(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"))
}

/// Build one record batch in the artifact column order.
pub fn records_to_batch(
    records: &[ReviewRecord],
    layout: CorpusLayout,
) -> Result<RecordBatch, StoreError> {
    let schema = match layout {
        CorpusLayout::Cleaned => reviews::cleaned_schema(),
        CorpusLayout::WithTopics => reviews::with_topics_schema(),
    };

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter(
            records.iter().map(|r| r.hotel_id.as_deref()),
        )),
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.source.key()),
        )),
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.provenance.as_str()),
        )),
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.title.as_str()),
        )),
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.body.as_str()),
        )),
        Arc::new(StringArray::from_iter(
            records.iter().map(|r| r.raw_rating.as_deref()),
        )),
        Arc::new(Float64Array::from_iter(
            records.iter().map(|r| r.harmonized_rating.map(round_display)),
        )),
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.sentiment.as_str()),
        )),
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.clean_comment.as_str()),
        )),
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.clean_text.as_str()),
        )),
    ];
    if layout == CorpusLayout::WithTopics {
        columns.push(Arc::new(Int64Array::from_iter(records.iter().map(|r| {
            r.topic_id.and_then(|t| i64::try_from(t).ok())
        }))));
    }

    Ok(RecordBatch::try_new(Arc::new(schema), columns)?)
}

/// Map artifact batches back onto review records.
///
/// `source` and `review_comment` are required; every other column is optional.
/// The harmonized rating is read from `rating_0_5` or the legacy `rating_1_5`.
pub fn batches_to_records(batches: &[RecordBatch]) -> Result<Vec<ReviewRecord>, StoreError> {
    let mut out = Vec::new();
    for batch in batches {
        let source = find_column(batch, &[reviews::SOURCE])
            .ok_or(StoreError::MissingColumn(reviews::SOURCE))?;
        let comment = find_column(batch, &[reviews::COMMENT])
            .ok_or(StoreError::MissingColumn(reviews::COMMENT))?;
        let hotel = find_column(batch, &[reviews::HOTEL]);
        let source_file = find_column(batch, &[reviews::SOURCE_FILE]);
        let title = find_column(batch, &[reviews::TITLE]);
        let rating_raw = find_column(batch, &[reviews::RATING_RAW]);
        let rating = find_column(batch, &[reviews::RATING, reviews::LEGACY_RATING]);
        let sentiment = find_column(batch, &[reviews::SENTIMENT]);
        let clean_comment = find_column(batch, &[reviews::CLEAN_COMMENT]);
        let clean_text = find_column(batch, &[reviews::CLEAN_FULL_TEXT]);
        let topic = find_column(batch, &[reviews::TOPIC]);

        let text = |idx: Option<usize>, row: usize| -> String {
            idx.and_then(|i| get_string(batch.column(i).as_ref(), row))
                .unwrap_or_default()
        };

        for row in 0..batch.num_rows() {
            let provenance = text(source_file, row);
            let src = get_string(batch.column(source).as_ref(), row)
                .and_then(|s| Source::parse(&s))
                .unwrap_or_else(|| Source::from_provenance(&provenance));
            let mut record = ReviewRecord::raw(src, provenance);
            record.hotel_id = hotel.and_then(|i| get_text(batch.column(i).as_ref(), row));
            record.title = text(title, row);
            record.body = text(Some(comment), row);
            record.raw_rating = rating_raw.and_then(|i| get_text(batch.column(i).as_ref(), row));
            record.harmonized_rating = rating.and_then(|i| get_f64(batch.column(i).as_ref(), row));
            record.sentiment = Sentiment::parse(&text(sentiment, row));
            record.clean_comment = text(clean_comment, row);
            record.clean_text = text(clean_text, row);
            record.topic_id = topic.and_then(|i| get_index(batch.column(i).as_ref(), row));
            out.push(record);
        }
    }
    Ok(out)
}

/// Write records as a corpus artifact, creating parent directories.
pub fn write_corpus(
    path: &Path,
    records: &[ReviewRecord],
    layout: CorpusLayout,
) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let batch = records_to_batch(records, layout)?;
    let file = File::create(path)?;

    if is_parquet(path) {
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
        writer.write(&batch)?;
        writer.close()?;
    } else {
        let mut writer = WriterBuilder::new().with_header(true).build(file);
        writer.write(&batch)?;
    }

    info!(path = %path.display(), rows = records.len(), ?layout, "wrote corpus");
    Ok(())
}

/// Read a corpus artifact written by [`write_corpus`] (or an older one using
/// `rating_1_5`).
pub fn read_corpus(path: &Path) -> Result<Vec<ReviewRecord>, StoreError> {
    let batches = if is_parquet(path) {
        read_parquet(path)?
    } else {
        read_csv_as_strings(File::open(path)?)?
    };
    let records = batches_to_records(&batches)?;
    info!(path = %path.display(), rows = records.len(), "read corpus");
    Ok(records)
}

/// Read a Parquet file into Arrow RecordBatches.
pub fn read_parquet(path: &Path) -> Result<Vec<RecordBatch>, StoreError> {
    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    let batches: Result<Vec<RecordBatch>, _> = reader.collect();
    Ok(batches?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Vec<ReviewRecord> {
        let mut a = ReviewRecord::raw(Source::Booking, "booking.csv");
        a.hotel_id = Some("Addis Grand".into());
        a.title = "Lovely, quiet".into();
        a.body = "Great \"injera\" breakfast\nand pool".into();
        a.raw_rating = Some("9".into());
        a.harmonized_rating = Some(4.5);
        a.sentiment = Sentiment::Positive;
        a.clean_comment = "great injera breakfast pool".into();
        a.clean_text = "lovely quiet great injera breakfast pool".into();
        a.topic_id = Some(3);

        let mut b = ReviewRecord::raw(Source::Other("expedia".into()), "expedia.csv");
        b.body = "meh".into();
        b.harmonized_rating = Some(2.0 / 3.0 * 5.0);
        b.clean_comment = "meh".into();
        b.clean_text = "meh".into();
        vec![a, b]
    }

    #[test]
    fn batch_has_artifact_column_order() {
        let batch = records_to_batch(&sample(), CorpusLayout::Cleaned).unwrap();
        let names: Vec<_> = batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();
        assert_eq!(
            names,
            [
                "hotel_name",
                "source",
                "source_file",
                "review_title",
                "review_comment",
                "rating_raw",
                "rating_0_5",
                "sentiment",
                "clean_comment",
                "clean_full_text"
            ]
        );
    }

    #[test]
    fn csv_roundtrip_with_topics() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clean/reviews_with_topics.csv");
        write_corpus(&path, &sample(), CorpusLayout::WithTopics).unwrap();
        let back = read_corpus(&path).unwrap();

        assert_eq!(back.len(), 2);
        assert_eq!(back[0], sample()[0]);
        assert_eq!(back[1].source, Source::Other("expedia".into()));
        assert_eq!(back[1].hotel_id, None);
        assert_eq!(back[1].raw_rating, None);
        // Persisted rating is the rounded display value.
        assert_eq!(back[1].harmonized_rating, Some(3.3));
        assert_eq!(back[1].sentiment, Sentiment::Unknown);
        assert_eq!(back[1].topic_id, None);
    }

    #[test]
    fn parquet_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reviews_cleaned.parquet");
        write_corpus(&path, &sample(), CorpusLayout::Cleaned).unwrap();
        let back = read_corpus(&path).unwrap();
        let mut expected = sample();
        expected[0].topic_id = None;
        assert_eq!(back[0], expected[0]);
        assert_eq!(back[1].harmonized_rating, Some(3.3));
    }

    #[test]
    fn legacy_rating_column_is_accepted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("legacy.csv");
        std::fs::write(
            &path,
            "hotel_name,source,review_comment,rating_1_5,sentiment\nA,tripadvisor,ok,3.0,neutral\n",
        )
        .unwrap();
        let back = read_corpus(&path).unwrap();
        assert_eq!(back[0].harmonized_rating, Some(3.0));
        assert_eq!(back[0].sentiment, Sentiment::Neutral);
        assert_eq!(back[0].source, Source::TripAdvisor);
    }

    #[test]
    fn missing_required_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "hotel_name,source\nA,booking\n").unwrap();
        assert!(matches!(
            read_corpus(&path),
            Err(StoreError::MissingColumn("review_comment"))
        ));
    }
}
