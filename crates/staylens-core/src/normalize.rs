//! Deterministic review text normalization.
//!
//! The pipeline runs in a fixed order so results are reproducible:
//!
//! 1. concatenate title and body, lowercase
//! 2. strip URLs (`http://`, `https://`, `www.` up to the next whitespace)
//! 3. strip standalone numbers
//! 4. replace every non-word, non-space character with a space
//! 5. collapse whitespace and trim
//! 6. drop stopwords and short tokens, lemmatize the rest
//! 7. join with single spaces
//!
//! Lemmas are filtered with the same rules as tokens, so the output of
//! [`Normalizer::normalize`] is a fixed point of it.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::NormalizerConfig;
use crate::lemma::lemmatize;

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:https?://|www\.)\S*").expect("url pattern"));
static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d+\b").expect("number pattern"));
static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").expect("punct pattern"));
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("space pattern"));

/// English stopword list shared by the normalizer and the bag-of-words
/// vectorizers.
pub fn english_stopwords() -> HashSet<String> {
    stop_words::get(stop_words::LANGUAGE::English)
        .into_iter()
        .map(|w| w.to_lowercase())
        .collect()
}

/// Text normalizer with a fixed stopword list and minimum token length.
#[derive(Debug, Clone)]
pub struct Normalizer {
    stopwords: HashSet<String>,
    min_token_len: usize,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&NormalizerConfig::default())
    }
}

impl Normalizer {
    pub fn new(config: &NormalizerConfig) -> Self {
        let mut stopwords = english_stopwords();
        stopwords.extend(config.extra_stopwords.iter().map(|w| w.to_lowercase()));
        Self::with_stopwords(stopwords, config.min_token_len)
    }

    /// Build a normalizer with an explicit stopword list.
    pub fn with_stopwords(stopwords: HashSet<String>, min_token_len: usize) -> Self {
        Self {
            stopwords,
            min_token_len,
        }
    }

    /// Normalize a review from its optional title and body.
    pub fn normalize_review(&self, title: Option<&str>, body: Option<&str>) -> String {
        let title = title.unwrap_or_default();
        let body = body.unwrap_or_default();
        self.normalize(&format!("{title} {body}"))
    }

    /// Normalize one string. Empty or all-stopword input yields `""`.
    pub fn normalize(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let no_urls = URL.replace_all(&lowered, "");
        let no_numbers = NUMBER.replace_all(&no_urls, "");
        let words_only = NON_WORD.replace_all(&no_numbers, " ");
        let collapsed = SPACES.replace_all(&words_only, " ");

        collapsed
            .trim()
            .split(' ')
            .filter(|t| self.keep(t))
            .map(lemmatize)
            .filter(|lemma| self.keep(lemma) && !lemma.chars().all(char::is_numeric))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn keep(&self, token: &str) -> bool {
        token.chars().count() >= self.min_token_len && !self.stopwords.contains(token)
    }

    /// Whether `token` is on this normalizer's stopword list.
    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const STOPWORDS: &[&str] = &[
        "the", "and", "were", "was", "us", "we", "for", "with", "via", "of", "it", "is", "in",
        "to", "can", "then",
    ];

    fn normalizer() -> Normalizer {
        Normalizer::with_stopwords(STOPWORDS.iter().map(|s| s.to_string()).collect(), 3)
    }

    #[test]
    fn basic_review() {
        let n = normalizer();
        let out = n.normalize_review(
            Some("Great Stay!!"),
            Some("The rooms were clean and the staff loved helping us."),
        );
        assert_eq!(out, "great stay room clean staff love help");
    }

    #[test]
    fn strips_urls_and_numbers() {
        let n = normalizer();
        let out = n.normalize("Booked via https://example.com/deal?x=1 and www.hotel.com for 120 dollars");
        assert_eq!(out, "book dollar");
    }

    #[test]
    fn keeps_alphanumeric_tokens() {
        let n = normalizer();
        assert_eq!(n.normalize("room 101b was fine"), "room 101b fine");
    }

    #[test]
    fn empty_and_absent_inputs() {
        let n = normalizer();
        assert_eq!(n.normalize(""), "");
        assert_eq!(n.normalize("   "), "");
        assert_eq!(n.normalize_review(None, None), "");
        assert_eq!(n.normalize("the and of it is"), "");
    }

    #[test]
    fn drops_short_tokens() {
        let n = normalizer();
        assert_eq!(n.normalize("ok tv spa pool"), "spa pool");
    }

    #[test]
    fn extra_stopwords_from_config() {
        let config = NormalizerConfig {
            extra_stopwords: vec!["Hotel".into()],
            ..Default::default()
        };
        let n = Normalizer::new(&config);
        assert!(n.is_stopword("hotel"));
        assert!(!n.normalize("Hotel pool").split(' ').any(|t| t == "hotel"));
    }

    #[test]
    fn deterministic() {
        let n = normalizer();
        let text = "Breakfast was AMAZING; the views, stunning.";
        assert_eq!(n.normalize(text), n.normalize(text));
    }

    #[test]
    fn fixed_point_on_literals() {
        let n = normalizer();
        for text in [
            "We stayed 3 nights in 2023 — pleased with everything!!",
            "100s of mosquitoes, can't sleep",
            "Check www.example.org/x?y=z then http://a.b/c",
            "Naïve café, crème brûlée was délicieux",
            "snake_case_tokens and __ dunder __",
        ] {
            let once = n.normalize(text);
            assert_eq!(n.normalize(&once), once, "input {text:?}");
        }
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(s in "\\PC{0,80}") {
            let n = Normalizer::default();
            let once = n.normalize(&s);
            prop_assert_eq!(n.normalize(&once), once);
        }

        #[test]
        fn review_words_are_idempotent(words in proptest::collection::vec("[a-zA-Z0-9.,!' ]{0,12}", 0..12)) {
            let n = normalizer();
            let once = n.normalize(&words.join(" "));
            prop_assert_eq!(n.normalize(&once), once);
        }
    }
}
