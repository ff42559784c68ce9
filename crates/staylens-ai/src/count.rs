//! Bag-of-words vocabulary and term counting.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use staylens_core::english_stopwords;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern"));

/// Lowercased word tokens of two or more word characters.
pub fn tokens(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Ordered term list with a reverse index. Serialized as the term list only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    terms: Vec<String>,
    index: HashMap<String, usize>,
}

impl From<Vec<String>> for Vocabulary {
    fn from(terms: Vec<String>) -> Self {
        let index = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        Self { terms, index }
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(v: Vocabulary) -> Self {
        v.terms
    }
}

impl Vocabulary {
    /// Keep the `max_features` most frequent terms (ties alphabetical), then
    /// order the survivors alphabetically.
    pub fn select(frequencies: HashMap<String, usize>, max_features: usize) -> Self {
        let mut ranked: Vec<(String, usize)> = frequencies.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(max_features);
        let mut terms: Vec<String> = ranked.into_iter().map(|(t, _)| t).collect();
        terms.sort();
        Self::from(terms)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn get(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    pub fn term(&self, idx: usize) -> Option<&str> {
        self.terms.get(idx).map(String::as_str)
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

/// Term-count vectorizer for topic modelling.
#[derive(Debug, Clone)]
pub struct CountVectorizer {
    max_features: usize,
    stopwords: HashSet<String>,
}

impl CountVectorizer {
    /// Vectorizer excluding the English stopword list.
    pub fn new(max_features: usize) -> Self {
        Self::with_stopwords(max_features, english_stopwords())
    }

    pub fn with_stopwords(max_features: usize, stopwords: HashSet<String>) -> Self {
        Self {
            max_features,
            stopwords,
        }
    }

    fn analyze(&self, text: &str) -> Vec<String> {
        tokens(text)
            .into_iter()
            .filter(|t| !self.stopwords.contains(t))
            .collect()
    }

    /// Build the vocabulary from corpus-wide term frequencies.
    pub fn fit<S: AsRef<str>>(&self, texts: &[S]) -> Vocabulary {
        let mut freq: HashMap<String, usize> = HashMap::new();
        for text in texts {
            for t in self.analyze(text.as_ref()) {
                *freq.entry(t).or_default() += 1;
            }
        }
        Vocabulary::select(freq, self.max_features)
    }

    /// Vocabulary indices of every in-vocabulary token, in text order.
    pub fn token_ids(&self, vocabulary: &Vocabulary, text: &str) -> Vec<usize> {
        self.analyze(text)
            .iter()
            .filter_map(|t| vocabulary.get(t))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vectorizer(max: usize) -> CountVectorizer {
        CountVectorizer::with_stopwords(max, ["the", "and"].iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn tokens_need_two_word_chars() {
        assert_eq!(tokens("A pool, the SPA & x2"), ["pool", "the", "spa", "x2"]);
    }

    #[test]
    fn vocabulary_keeps_most_frequent_alphabetically() {
        let texts = ["pool pool spa", "the breakfast pool", "spa view", "bar"];
        let vocab = vectorizer(3).fit(&texts);
        // pool 3, spa 2, then bar/breakfast/view tie at 1: "bar" wins.
        assert_eq!(vocab.terms(), ["bar", "pool", "spa"]);
        assert_eq!(vocab.get("pool"), Some(1));
        assert_eq!(vocab.get("the"), None);
    }

    #[test]
    fn token_ids_skip_out_of_vocabulary() {
        let v = vectorizer(10);
        let vocab = v.fit(&["room clean", "room quiet"]);
        assert_eq!(v.token_ids(&vocab, "Room and noisy room"), [2, 2]);
    }

    #[test]
    fn vocabulary_serializes_as_term_list() {
        let vocab = Vocabulary::from(vec!["a1".to_string(), "b2".to_string()]);
        let json = serde_json::to_string(&vocab).unwrap();
        assert_eq!(json, r#"["a1","b2"]"#);
        let back: Vocabulary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get("b2"), Some(1));
    }
}
