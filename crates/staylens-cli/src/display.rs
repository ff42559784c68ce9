//! Plain-text rendering of corpus summaries, topics and model reports.

use std::collections::BTreeMap;

use staylens_ai::{ClassificationReport, TopicBundle, Variant};
use staylens_core::{CorpusSummary, Sentiment};

const KEYWORDS_SHOWN: usize = 10;

pub fn print_summary(summary: &CorpusSummary) {
    println!("Reviews:          {}", summary.total_reviews);
    println!("Hotels:           {}", summary.distinct_hotels);
    match summary.mean_rating {
        Some(mean) => println!("Mean rating (0-5): {mean:.2}"),
        None => println!("Mean rating (0-5): -"),
    }

    println!();
    println!("Sentiment");
    for label in [
        Sentiment::Positive,
        Sentiment::Neutral,
        Sentiment::Negative,
        Sentiment::Unknown,
    ] {
        println!("  {:<10} {:>8}", label.as_str(), summary.sentiment_count(label));
    }

    println!();
    println!("Reviews per hotel and source");
    for ((hotel, source), count) in &summary.by_hotel_source {
        println!("  {hotel:<32} {source:<14} {count:>8}");
    }

    if !summary.topic_counts.is_empty() {
        println!();
        println!("Reviews per topic");
        for (topic, count) in &summary.topic_counts {
            println!("  {topic:<6} {count:>8}");
        }
    }
}

pub fn print_topics(bundle: &TopicBundle, counts: &[usize]) {
    println!("LDA topic keywords");
    for (topic, words) in bundle.keywords.iter().enumerate() {
        let shown: Vec<&str> = words.iter().take(KEYWORDS_SHOWN).map(String::as_str).collect();
        let docs = counts.get(topic).copied().unwrap_or(0);
        println!("  {topic:>2} ({docs:>6} docs)  {}", shown.join(", "));
    }
}

pub fn print_reports(reports: &BTreeMap<Variant, ClassificationReport>) {
    for report in reports.values() {
        println!("{report}");
    }
}

pub fn print_top_terms(sentiment: Sentiment, terms: &[(String, f64)]) {
    println!("Top TF-IDF terms: {sentiment}");
    if terms.is_empty() {
        println!("  (no reviews)");
    }
    for (term, score) in terms {
        println!("  {term:<30} {score:.4}");
    }
}
