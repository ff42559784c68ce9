//! Corpus summary statistics for exploratory analysis and dashboard KPIs.

use std::collections::BTreeMap;

use crate::record::ReviewRecord;
use crate::sentiment::Sentiment;

/// Aggregate counts over a set of reviews.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorpusSummary {
    pub total_reviews: usize,
    pub distinct_hotels: usize,
    /// (hotel, source) → review count. Missing hotels are keyed `"unknown"`.
    pub by_hotel_source: BTreeMap<(String, String), usize>,
    /// Mean harmonized rating over rated reviews, `None` if none are rated.
    pub mean_rating: Option<f64>,
    pub sentiment_counts: BTreeMap<Sentiment, usize>,
    /// Topic id → review count, only for reviews with a topic.
    pub topic_counts: BTreeMap<usize, usize>,
}

impl CorpusSummary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ReviewRecord>) -> Self {
        let mut summary = Self::default();
        let mut rating_sum = 0.0;
        let mut rated = 0usize;

        for r in records {
            summary.total_reviews += 1;
            let hotel = r.hotel_id.clone().unwrap_or_else(|| "unknown".to_string());
            *summary
                .by_hotel_source
                .entry((hotel, r.source.key().to_string()))
                .or_default() += 1;
            if let Some(v) = r.harmonized_rating {
                rating_sum += v;
                rated += 1;
            }
            *summary.sentiment_counts.entry(r.sentiment).or_default() += 1;
            if let Some(t) = r.topic_id {
                *summary.topic_counts.entry(t).or_default() += 1;
            }
        }

        summary.distinct_hotels = summary
            .by_hotel_source
            .keys()
            .map(|(hotel, _)| hotel.as_str())
            .collect::<std::collections::BTreeSet<_>>()
            .len();
        summary.mean_rating = (rated > 0).then(|| rating_sum / rated as f64);
        summary
    }

    pub fn sentiment_count(&self, sentiment: Sentiment) -> usize {
        self.sentiment_counts.get(&sentiment).copied().unwrap_or(0)
    }
}
