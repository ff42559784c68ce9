//! Per-record cleaning: rating harmonization, label derivation and text
//! normalization.

use tracing::info;

use crate::config::IngestConfig;
use crate::normalize::Normalizer;
use crate::rating::harmonize;
use crate::record::ReviewRecord;
use crate::sentiment::derive_sentiment;

/// Counts reported after cleaning a batch of records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanStats {
    pub records: usize,
    pub rated: usize,
    pub labelled: usize,
    pub empty_text: usize,
}

/// Fill in every derived field of one record in place.
///
/// Re-running on an already cleaned record yields the same result.
pub fn clean_record(record: &mut ReviewRecord, normalizer: &Normalizer, ingest: &IngestConfig) {
    let scale = ingest.scale_for(record.source.key());
    record.harmonized_rating = harmonize(record.raw_rating.as_deref(), scale);
    record.sentiment = derive_sentiment(record.sentiment, record.harmonized_rating);
    record.clean_comment = normalizer.normalize(&record.body);
    record.clean_text = normalizer.normalize_review(Some(&record.title), Some(&record.body));
}

/// Clean a whole table.
pub fn clean_records(
    records: &mut [ReviewRecord],
    normalizer: &Normalizer,
    ingest: &IngestConfig,
) -> CleanStats {
    let mut stats = CleanStats {
        records: records.len(),
        ..Default::default()
    };
    for record in records.iter_mut() {
        clean_record(record, normalizer, ingest);
        if record.harmonized_rating.is_some() {
            stats.rated += 1;
        }
        if record.sentiment.is_known() {
            stats.labelled += 1;
        }
        if record.clean_text.is_empty() {
            stats.empty_text += 1;
        }
    }
    info!(
        records = stats.records,
        rated = stats.rated,
        labelled = stats.labelled,
        empty_text = stats.empty_text,
        "cleaned reviews"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Source;
    use crate::sentiment::Sentiment;

    fn normalizer() -> Normalizer {
        Normalizer::with_stopwords(
            ["the", "was", "and"].iter().map(|s| s.to_string()).collect(),
            3,
        )
    }

    fn record(source: Source, rating: Option<&str>, body: &str) -> ReviewRecord {
        let mut r = ReviewRecord::raw(source, "test.csv");
        r.raw_rating = rating.map(str::to_string);
        r.body = body.to_string();
        r.title = "Lovely".to_string();
        r
    }

    #[test]
    fn booking_rating_rescaled_and_labelled() {
        let mut r = record(Source::Booking, Some("9"), "The pool was great");
        clean_record(&mut r, &normalizer(), &IngestConfig::default());
        assert_eq!(r.harmonized_rating, Some(4.5));
        assert_eq!(r.sentiment, Sentiment::Positive);
        assert_eq!(r.clean_comment, "pool great");
        assert_eq!(r.clean_text, "lovely pool great");
    }

    #[test]
    fn tripadvisor_bubbles() {
        let mut r = record(Source::TripAdvisor, Some("bubble_30"), "ok");
        clean_record(&mut r, &normalizer(), &IngestConfig::default());
        assert_eq!(r.harmonized_rating, Some(3.0));
        assert_eq!(r.sentiment, Sentiment::Neutral);
    }

    #[test]
    fn explicit_label_kept_and_bad_rating_absent() {
        let mut r = record(Source::Booking, Some("great!"), "noisy");
        r.sentiment = Sentiment::Negative;
        clean_record(&mut r, &normalizer(), &IngestConfig::default());
        assert_eq!(r.harmonized_rating, None);
        assert_eq!(r.sentiment, Sentiment::Negative);
    }

    #[test]
    fn cleaning_is_repeatable() {
        let mut r = record(Source::Booking, Some("5"), "The staff and the food");
        let n = normalizer();
        let cfg = IngestConfig::default();
        clean_record(&mut r, &n, &cfg);
        let once = r.clone();
        clean_record(&mut r, &n, &cfg);
        assert_eq!(r, once);
    }

    #[test]
    fn stats_count_derived_fields() {
        let mut rs = vec![
            record(Source::Booking, Some("10"), "spotless"),
            record(Source::Booking, Some("5"), "average"),
            record(Source::Booking, None, ""),
        ];
        rs[2].title.clear();
        let stats = clean_records(&mut rs, &normalizer(), &IngestConfig::default());
        assert_eq!(stats.records, 3);
        assert_eq!(stats.rated, 2);
        // 10 → 5.0 positive, 5 → 2.5 gap band, none → unknown.
        assert_eq!(stats.labelled, 1);
        assert_eq!(stats.empty_text, 1);
    }
}
