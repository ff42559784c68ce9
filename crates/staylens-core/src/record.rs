//! Review records shared by every pipeline stage.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sentiment::Sentiment;

/// Review site a record came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Booking,
    TripAdvisor,
    /// Any other site, keyed by its lowercase name.
    Other(String),
}

impl Source {
    /// Parse a source column value (`"booking"`, `"Booking.com"`, `"tripadvisor"`).
    ///
    /// Returns `None` for blank input.
    pub fn parse(s: &str) -> Option<Self> {
        let key = s.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }
        Some(if key.starts_with("booking") {
            Self::Booking
        } else if key.starts_with("tripadvisor") || key == "trip advisor" {
            Self::TripAdvisor
        } else {
            Self::Other(key)
        })
    }

    /// Infer a source from the name of the file a table was read from.
    ///
    /// Falls back to `Other(<file stem>)`, so the result is never empty.
    pub fn from_provenance(file_name: &str) -> Self {
        let lower = file_name.to_lowercase();
        if lower.contains("booking") {
            Self::Booking
        } else if lower.contains("tripadvisor") {
            Self::TripAdvisor
        } else {
            let stem = Path::new(&lower)
                .file_stem()
                .and_then(|s| s.to_str())
                .filter(|s| !s.is_empty())
                .unwrap_or("unknown");
            Self::Other(stem.to_string())
        }
    }

    /// Lowercase key used for config lookups and persistence.
    pub fn key(&self) -> &str {
        match self {
            Self::Booking => "booking",
            Self::TripAdvisor => "tripadvisor",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One customer review.
///
/// Created by ingestion with raw fields populated; `harmonized_rating`,
/// `sentiment`, `clean_comment` and `clean_text` are filled in by cleaning and
/// `topic_id` by topic assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub hotel_id: Option<String>,
    pub source: Source,
    /// File the row was read from.
    pub provenance: String,
    pub title: String,
    pub body: String,
    /// Rating text in the source's native scale.
    pub raw_rating: Option<String>,
    /// Rating on the common 0–5 scale.
    pub harmonized_rating: Option<f64>,
    pub sentiment: Sentiment,
    /// Normalized body.
    pub clean_comment: String,
    /// Normalized title + body.
    pub clean_text: String,
    pub topic_id: Option<usize>,
}

impl ReviewRecord {
    /// A freshly ingested record with no derived fields.
    pub fn raw(source: Source, provenance: impl Into<String>) -> Self {
        Self {
            hotel_id: None,
            source,
            provenance: provenance.into(),
            title: String::new(),
            body: String::new(),
            raw_rating: None,
            harmonized_rating: None,
            sentiment: Sentiment::Unknown,
            clean_comment: String::new(),
            clean_text: String::new(),
            topic_id: None,
        }
    }

    /// Key used for cross-source de-duplication.
    pub fn dedup_key(&self) -> (&str, Option<&str>) {
        (self.body.as_str(), self.hotel_id.as_deref())
    }

    /// Whether this record can be used as a classifier training example.
    pub fn is_trainable(&self) -> bool {
        self.sentiment.is_known()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_source_variants() {
        assert_eq!(Source::parse("booking"), Some(Source::Booking));
        assert_eq!(Source::parse("Booking.com"), Some(Source::Booking));
        assert_eq!(Source::parse(" TripAdvisor "), Some(Source::TripAdvisor));
        assert_eq!(Source::parse("Expedia"), Some(Source::Other("expedia".into())));
        assert_eq!(Source::parse("   "), None);
    }

    #[test]
    fn provenance_inference() {
        assert_eq!(
            Source::from_provenance("haile_addis_booking.csv"),
            Source::Booking
        );
        assert_eq!(
            Source::from_provenance("TripAdvisor_hawassa.csv"),
            Source::TripAdvisor
        );
        assert_eq!(
            Source::from_provenance("expedia_gondar.csv"),
            Source::Other("expedia_gondar".into())
        );
    }

    #[test]
    fn source_key_is_never_empty() {
        assert_eq!(Source::from_provenance(".csv").key(), ".csv");
        assert!(!Source::from_provenance("").key().is_empty());
    }

    #[test]
    fn raw_record_is_untrainable() {
        let r = ReviewRecord::raw(Source::Booking, "a.csv");
        assert!(!r.is_trainable());
        assert_eq!(r.dedup_key(), ("", None));
    }
}
