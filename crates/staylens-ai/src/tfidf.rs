//! TF-IDF features for the sentiment classifiers.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::count::{Vocabulary, tokens};

/// Sparse row: `(feature index, value)` pairs sorted by index.
pub type SparseVec = Vec<(usize, f64)>;

/// Word n-gram TF-IDF vectorizer with smooth idf and L2-normalised rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: Vocabulary,
    idf: Vec<f64>,
    max_ngram: usize,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    stopwords: BTreeSet<String>,
}

impl TfidfVectorizer {
    /// Unigrams and bigrams, no stopword removal.
    pub fn fit<S: AsRef<str> + Sync>(texts: &[S], max_features: usize) -> Self {
        Self::fit_with(texts, max_features, 2, BTreeSet::new())
    }

    pub fn fit_with<S: AsRef<str> + Sync>(
        texts: &[S],
        max_features: usize,
        max_ngram: usize,
        stopwords: BTreeSet<String>,
    ) -> Self {
        let mut vectorizer = Self {
            vocabulary: Vocabulary::default(),
            idf: Vec::new(),
            max_ngram: max_ngram.max(1),
            stopwords,
        };

        let mut freq: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for text in texts {
            let terms = vectorizer.analyze(text.as_ref());
            let mut seen = HashSet::new();
            for term in terms {
                if seen.insert(term.clone()) {
                    *doc_freq.entry(term.clone()).or_default() += 1;
                }
                *freq.entry(term).or_default() += 1;
            }
        }

        let vocabulary = Vocabulary::select(freq, max_features);
        let n = texts.len() as f64;
        vectorizer.idf = vocabulary
            .terms()
            .iter()
            .map(|t| {
                let df = doc_freq.get(t).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();
        vectorizer.vocabulary = vocabulary;
        vectorizer
    }

    fn analyze(&self, text: &str) -> Vec<String> {
        let words: Vec<String> = tokens(text)
            .into_iter()
            .filter(|t| !self.stopwords.contains(t))
            .collect();
        let mut terms = words.clone();
        for n in 2..=self.max_ngram {
            terms.extend(words.windows(n).map(|w| w.join(" ")));
        }
        terms
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|i| self.idf[i])
    }

    /// One L2-normalised row. Text with no known terms gives an empty row.
    pub fn transform(&self, text: &str) -> SparseVec {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in self.analyze(text) {
            if let Some(i) = self.vocabulary.get(&term) {
                *counts.entry(i).or_default() += 1.0;
            }
        }
        let mut row: SparseVec = counts
            .into_iter()
            .map(|(i, tf)| (i, tf * self.idf[i]))
            .collect();
        let norm = row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            row.iter_mut().for_each(|(_, v)| *v /= norm);
        }
        row
    }

    pub fn transform_all<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Vec<SparseVec> {
        texts.par_iter().map(|t| self.transform(t.as_ref())).collect()
    }
}

/// Highest mean TF-IDF terms across `texts`, scored by a vectorizer fitted on
/// those texts alone (unigrams and bigrams, at most 5000 terms).
pub fn top_terms<S: AsRef<str> + Sync>(
    texts: &[S],
    top_n: usize,
    stopwords: BTreeSet<String>,
) -> Vec<(String, f64)> {
    if texts.is_empty() {
        return Vec::new();
    }
    let vectorizer = TfidfVectorizer::fit_with(texts, 5000, 2, stopwords);
    let mut sums = vec![0.0; vectorizer.n_features()];
    for row in vectorizer.transform_all(texts) {
        for (i, v) in row {
            sums[i] += v;
        }
    }
    let n = texts.len() as f64;
    let mut scored: Vec<(String, f64)> = vectorizer
        .vocabulary
        .terms()
        .iter()
        .zip(sums)
        .map(|(t, s)| (t.clone(), s / n))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    scored.truncate(top_n);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smooth_idf() {
        let v = TfidfVectorizer::fit(&["good room", "good view"], 100);
        assert_eq!(v.idf("good"), Some(1.0));
        let rare = (3.0f64 / 2.0).ln() + 1.0;
        assert!((v.idf("room").unwrap() - rare).abs() < 1e-12);
        assert!((v.idf("good room").unwrap() - rare).abs() < 1e-12);
        assert_eq!(v.idf("room good"), None);
    }

    #[test]
    fn rows_are_unit_length_and_sorted() {
        let v = TfidfVectorizer::fit(&["good room", "good view", "bad room"], 100);
        let row = v.transform("good room good");
        let norm: f64 = row.iter().map(|(_, x)| x * x).sum();
        assert!((norm - 1.0).abs() < 1e-12);
        assert!(row.windows(2).all(|w| w[0].0 < w[1].0));
        assert!(v.transform("nothing known here").is_empty());
    }

    #[test]
    fn feature_bound_keeps_most_frequent() {
        let v = TfidfVectorizer::fit_with(&["pool pool pool spa", "pool spa bar"], 2, 1, BTreeSet::new());
        assert_eq!(v.n_features(), 2);
        assert!(v.idf("pool").is_some());
        assert!(v.idf("spa").is_some());
        assert!(v.idf("bar").is_none());
    }

    #[test]
    fn stopwords_removed_before_bigrams() {
        let stop: BTreeSet<String> = ["the".to_string()].into();
        let v = TfidfVectorizer::fit_with(&["clean the room"], 100, 2, stop);
        assert!(v.idf("clean room").is_some());
        assert!(v.idf("the").is_none());
    }

    #[test]
    fn json_roundtrip_transforms_identically() {
        let v = TfidfVectorizer::fit(&["friendly staff", "slow wifi"], 100);
        let back: TfidfVectorizer = serde_json::from_str(&serde_json::to_string(&v).unwrap()).unwrap();
        assert_eq!(back.transform("friendly wifi"), v.transform("friendly wifi"));
    }

    #[test]
    fn top_terms_ranked() {
        let texts = ["great pool", "great staff", "great pool view"];
        let terms = top_terms(&texts, 3, BTreeSet::new());
        assert_eq!(terms.len(), 3);
        assert!(terms.windows(2).all(|w| w[0].1 >= w[1].1));
        assert!(top_terms::<&str>(&[], 3, BTreeSet::new()).is_empty());
    }
}
