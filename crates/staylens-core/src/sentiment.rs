//! Sentiment labels and rating-based label derivation.
//!
//! Explicit labels supplied by a source always win. When a review carries no
//! usable label, one is derived from its harmonized 0–5 rating:
//!
//! | rating            | label      |
//! |-------------------|------------|
//! | `>= 4.0`          | `positive` |
//! | `== 3.0`          | `neutral`  |
//! | `<= 2.0`          | `negative` |
//! | `(2, 3)`, `(3, 4)` or absent | `unknown` |
//!
//! The two gap bands are deliberate: reviews in them never enter training.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Categorical sentiment of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
    Unknown,
}

impl Sentiment {
    /// The three classes a classifier is trained on, in label order.
    pub const TRAINABLE: [Sentiment; 3] = [Self::Negative, Self::Neutral, Self::Positive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Positive => "positive",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a source-supplied label. Anything unrecognised is `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Self::Positive,
            "neutral" => Self::Neutral,
            "negative" => Self::Negative,
            _ => Self::Unknown,
        }
    }

    /// Whether this label may be used as a training target.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Position in [`Self::TRAINABLE`], `None` for `Unknown`.
    pub fn class_index(&self) -> Option<usize> {
        Self::TRAINABLE.iter().position(|s| s == self)
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive a label from a harmonized 0–5 rating.
pub fn label_from_rating(rating: Option<f64>) -> Sentiment {
    match rating {
        Some(r) if r.is_nan() => Sentiment::Unknown,
        Some(r) if r >= 4.0 => Sentiment::Positive,
        Some(r) if r == 3.0 => Sentiment::Neutral,
        Some(r) if r <= 2.0 => Sentiment::Negative,
        _ => Sentiment::Unknown,
    }
}

/// Keep an explicit label, otherwise derive one from the rating.
pub fn derive_sentiment(existing: Sentiment, rating: Option<f64>) -> Sentiment {
    if existing.is_known() {
        existing
    } else {
        label_from_rating(rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_policy() {
        assert_eq!(label_from_rating(Some(4.0)), Sentiment::Positive);
        assert_eq!(label_from_rating(Some(5.0)), Sentiment::Positive);
        assert_eq!(label_from_rating(Some(3.0)), Sentiment::Neutral);
        assert_eq!(label_from_rating(Some(2.0)), Sentiment::Negative);
        assert_eq!(label_from_rating(Some(0.0)), Sentiment::Negative);
        assert_eq!(label_from_rating(None), Sentiment::Unknown);
    }

    #[test]
    fn gap_bands_are_unknown() {
        for r in [2.01, 2.5, 2.99, 3.01, 3.5, 3.99] {
            assert_eq!(label_from_rating(Some(r)), Sentiment::Unknown, "rating {r}");
        }
        assert_eq!(label_from_rating(Some(f64::NAN)), Sentiment::Unknown);
    }

    #[test]
    fn explicit_label_wins() {
        assert_eq!(
            derive_sentiment(Sentiment::Negative, Some(5.0)),
            Sentiment::Negative
        );
        assert_eq!(
            derive_sentiment(Sentiment::Unknown, Some(5.0)),
            Sentiment::Positive
        );
        assert_eq!(derive_sentiment(Sentiment::Unknown, None), Sentiment::Unknown);
    }

    #[test]
    fn parse_is_lenient_on_case_and_whitespace() {
        assert_eq!(Sentiment::parse(" Positive "), Sentiment::Positive);
        assert_eq!(Sentiment::parse("NEGATIVE"), Sentiment::Negative);
        assert_eq!(Sentiment::parse("meh"), Sentiment::Unknown);
        assert_eq!(Sentiment::parse(""), Sentiment::Unknown);
    }

    #[test]
    fn class_indices_follow_label_order() {
        assert_eq!(Sentiment::Negative.class_index(), Some(0));
        assert_eq!(Sentiment::Neutral.class_index(), Some(1));
        assert_eq!(Sentiment::Positive.class_index(), Some(2));
        assert_eq!(Sentiment::Unknown.class_index(), None);
    }
}
