//! View filters over the review table (hotel, sentiment, topic).
//!
//! Filtering never removes records from the table, it only selects a view.

use crate::record::ReviewRecord;
use crate::sentiment::Sentiment;

/// Conjunction of optional criteria; `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewFilter {
    pub hotel: Option<String>,
    pub sentiment: Option<Sentiment>,
    pub topic: Option<usize>,
}

impl ReviewFilter {
    pub fn matches(&self, record: &ReviewRecord) -> bool {
        self.hotel
            .as_deref()
            .is_none_or(|h| record.hotel_id.as_deref() == Some(h))
            && self.sentiment.is_none_or(|s| record.sentiment == s)
            && self.topic.is_none_or(|t| record.topic_id == Some(t))
    }

    /// Records matching the filter, in table order.
    pub fn apply<'a>(&'a self, records: &'a [ReviewRecord]) -> impl Iterator<Item = &'a ReviewRecord> {
        records.iter().filter(move |r| self.matches(r))
    }
}
