//! Rating harmonization onto a common 0–5 scale.
//!
//! Each source reports ratings in its own native scale:
//!
//! - Booking.com scores reviews 0–10 (`"8.5"`, sometimes `"8,5"`).
//! - TripAdvisor encodes bubbles as CSS classes in tenths of a bubble
//!   (`"bubble_45"` is 4.5 bubbles out of 5), so the native maximum is 50.
//!   Scraper output may already hold the bubble count (`"4.0"`); a value
//!   written with a decimal point, or a whole number up to 5, is read as
//!   bubbles rather than tenths.
//! - Anything already on a 0–5 scale passes through unchanged.
//!
//! Harmonization is a linear rescale `value * 5 / source_max`. Values that do
//! not parse, or fall outside the scale's domain, become `None` rather than an
//! error: one bad cell never fails a run.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+(?:[.,]\d+)?").expect("number pattern"));
static BUBBLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"bubble_(\d+)").expect("bubble pattern"));

/// Upper bound of the harmonized scale.
pub const HARMONIZED_MAX: f64 = 5.0;

/// Native rating scale declared for a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingScale {
    /// 0–10 review score.
    TenPoint,
    /// Bubble rating in tenths, 0–50.
    BubbleTenths,
    /// Already 0–5.
    FivePoint,
}

impl RatingScale {
    /// Largest valid native value.
    pub fn source_max(&self) -> f64 {
        match self {
            Self::TenPoint => 10.0,
            Self::BubbleTenths => 50.0,
            Self::FivePoint => 5.0,
        }
    }

    /// Parse raw rating text into a native-scale number.
    ///
    /// Does not range-check; see [`harmonize`].
    pub fn parse(&self, raw: &str) -> Option<f64> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Self::BubbleTenths = self
            && let Some(caps) = BUBBLE.captures(raw)
        {
            return caps[1].parse().ok();
        }
        let text = NUMBER.find(raw)?.as_str();
        let value = text.replace(',', ".").parse::<f64>().ok()?;
        match self {
            Self::BubbleTenths if is_bubble_count(text, value) => Some(value * 10.0),
            _ => Some(value),
        }
    }

    /// Whether a native value lies inside this scale's domain.
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && (0.0..=self.source_max()).contains(&value)
    }
}

/// Whether a bare number on the bubble scale is a count of bubbles rather
/// than tenths: anything with a decimal part, or a whole number up to 5.
/// Whole numbers from 6 to 50 stay tenths.
fn is_bubble_count(text: &str, value: f64) -> bool {
    text.contains(['.', ',']) || (0.0..=HARMONIZED_MAX).contains(&value)
}

/// Map a raw rating onto [0, 5]. Returns `None` for missing, unparseable or
/// out-of-domain input.
pub fn harmonize(raw: Option<&str>, scale: RatingScale) -> Option<f64> {
    let value = scale.parse(raw?)?;
    harmonize_value(value, scale)
}

/// Rescale an already-parsed native value.
pub fn harmonize_value(value: f64, scale: RatingScale) -> Option<f64> {
    if !scale.contains(value) {
        return None;
    }
    // Multiply before dividing so 6/10 and 30/50 land exactly on 3.0.
    Some(value * HARMONIZED_MAX / scale.source_max())
}

/// Round to one decimal place for display and persistence.
pub fn round_display(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ten_point_divides_by_two() {
        assert_eq!(harmonize(Some("8"), RatingScale::TenPoint), Some(4.0));
        assert_eq!(harmonize(Some("6"), RatingScale::TenPoint), Some(3.0));
        assert_eq!(harmonize(Some("10"), RatingScale::TenPoint), Some(5.0));
        assert_eq!(harmonize(Some("0"), RatingScale::TenPoint), Some(0.0));
    }

    #[test]
    fn ten_point_accepts_comma_and_prefix() {
        assert_eq!(harmonize(Some("8,5"), RatingScale::TenPoint), Some(4.25));
        assert_eq!(harmonize(Some("Scored 9.0"), RatingScale::TenPoint), Some(4.5));
    }

    #[test]
    fn bubble_classes_are_tenths() {
        assert_eq!(harmonize(Some("bubble_40"), RatingScale::BubbleTenths), Some(4.0));
        assert_eq!(
            harmonize(Some("ui_bubble_rating bubble_45"), RatingScale::BubbleTenths),
            Some(4.5)
        );
        assert_eq!(harmonize(Some("30"), RatingScale::BubbleTenths), Some(3.0));
    }

    #[test]
    fn decimal_bubble_counts_are_not_tenths() {
        let bubbles = RatingScale::BubbleTenths;
        assert_eq!(harmonize(Some("4.0"), bubbles), Some(4.0));
        assert_eq!(harmonize(Some("5.0"), bubbles), Some(5.0));
        assert_eq!(harmonize(Some("3,5"), bubbles), Some(3.5));
        assert_eq!(harmonize(Some("3.3"), bubbles), Some(3.3));
        assert_eq!(harmonize(Some("4"), bubbles), Some(4.0));
        assert_eq!(harmonize(Some("45"), bubbles), Some(4.5));
        assert_eq!(harmonize(Some("6"), bubbles), Some(0.6));
        assert_eq!(harmonize(Some("7.5"), bubbles), None);
        assert_eq!(
            crate::label_from_rating(harmonize(Some("5.0"), bubbles)),
            crate::Sentiment::Positive
        );
        assert_eq!(
            crate::label_from_rating(harmonize(Some("4.0"), bubbles)),
            crate::Sentiment::Positive
        );
    }

    #[test]
    fn five_point_passes_through() {
        assert_eq!(harmonize(Some("4.5"), RatingScale::FivePoint), Some(4.5));
    }

    #[test]
    fn malformed_and_out_of_domain_are_absent() {
        assert_eq!(harmonize(None, RatingScale::TenPoint), None);
        assert_eq!(harmonize(Some(""), RatingScale::TenPoint), None);
        assert_eq!(harmonize(Some("n/a"), RatingScale::TenPoint), None);
        assert_eq!(harmonize(Some("11"), RatingScale::TenPoint), None);
        assert_eq!(harmonize(Some("-1"), RatingScale::TenPoint), None);
        assert_eq!(harmonize(Some("bubble_60"), RatingScale::BubbleTenths), None);
        assert_eq!(harmonize(Some("7"), RatingScale::FivePoint), None);
    }

    #[test]
    fn display_rounding() {
        assert_eq!(round_display(4.25), 4.3);
        assert_eq!(round_display(3.04), 3.0);
        assert_eq!(round_display(5.0), 5.0);
    }

    proptest! {
        #[test]
        fn harmonized_values_stay_in_range(v in 0.0f64..=10.0) {
            let h = harmonize_value(v, RatingScale::TenPoint).unwrap();
            prop_assert!((0.0..=5.0).contains(&h));
        }

        #[test]
        fn bubble_values_stay_in_range(v in 0u32..=50) {
            let raw = format!("bubble_{v}");
            let h = harmonize(Some(&raw), RatingScale::BubbleTenths).unwrap();
            prop_assert!((0.0..=5.0).contains(&h));
        }

        #[test]
        fn arbitrary_text_never_escapes_range(s in ".*") {
            for scale in [RatingScale::TenPoint, RatingScale::BubbleTenths, RatingScale::FivePoint] {
                if let Some(h) = harmonize(Some(&s), scale) {
                    prop_assert!((0.0..=5.0).contains(&h));
                }
            }
        }
    }
}
