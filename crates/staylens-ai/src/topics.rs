//! Topic discovery with Latent Dirichlet Allocation.
//!
//! The model is fitted by collapsed Gibbs sampling over a bounded
//! bag-of-words. Every document, fitted or new, takes its topic mixture from
//! a fold-in against the fixed topic-term distribution, so the topics written
//! next to the training corpus are the ones the saved bundle reproduces.

use ndarray::{Array1, Array2};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use staylens_core::config::TopicConfig;
use tracing::{debug, info};

use crate::TopicError;
use crate::count::{CountVectorizer, Vocabulary, tokens};
use crate::models::argmax;

const FOLD_IN_ITERATIONS: usize = 50;

/// Fitted LDA model: symmetric priors plus topic-term assignment counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lda {
    n_topics: usize,
    alpha: f64,
    beta: f64,
    /// `n_topics x n_terms` assignment counts.
    topic_term: Array2<u32>,
    topic_totals: Array1<u64>,
}

impl Lda {
    /// Fit by collapsed Gibbs sampling with `alpha = beta = 1 / n_topics`.
    ///
    /// `docs` holds vocabulary indices below `n_terms`.
    pub fn fit(
        docs: &[Vec<usize>],
        n_terms: usize,
        n_topics: usize,
        iterations: usize,
        seed: u64,
    ) -> Result<Self, TopicError> {
        if n_topics == 0 {
            return Err(TopicError::InvalidTopicCount);
        }
        if n_terms == 0 {
            return Err(TopicError::EmptyVocabulary);
        }

        let k = n_topics;
        let alpha = 1.0 / k as f64;
        let beta = alpha;
        let v_beta = beta * n_terms as f64;
        let mut rng = StdRng::seed_from_u64(seed);

        let mut topic_term = Array2::<u32>::zeros((k, n_terms));
        let mut topic_totals = Array1::<u64>::zeros(k);
        let mut doc_topic = Array2::<u32>::zeros((docs.len(), k));
        let mut z: Vec<Vec<usize>> = Vec::with_capacity(docs.len());

        for (d, doc) in docs.iter().enumerate() {
            let mut zd = Vec::with_capacity(doc.len());
            for &w in doc {
                let t = rng.gen_range(0..k);
                topic_term[[t, w]] += 1;
                topic_totals[t] += 1;
                doc_topic[[d, t]] += 1;
                zd.push(t);
            }
            z.push(zd);
        }

        let mut cumulative = vec![0.0f64; k];
        for iteration in 0..iterations {
            for (d, doc) in docs.iter().enumerate() {
                for (i, &w) in doc.iter().enumerate() {
                    let old = z[d][i];
                    topic_term[[old, w]] -= 1;
                    topic_totals[old] -= 1;
                    doc_topic[[d, old]] -= 1;

                    let mut total = 0.0;
                    for t in 0..k {
                        total += (f64::from(doc_topic[[d, t]]) + alpha)
                            * (f64::from(topic_term[[t, w]]) + beta)
                            / (topic_totals[t] as f64 + v_beta);
                        cumulative[t] = total;
                    }
                    let u = rng.gen_range(0.0..total);
                    let new = cumulative.iter().position(|&c| u < c).unwrap_or(k - 1);

                    topic_term[[new, w]] += 1;
                    topic_totals[new] += 1;
                    doc_topic[[d, new]] += 1;
                    z[d][i] = new;
                }
            }
            if (iteration + 1) % 50 == 0 {
                debug!(iteration = iteration + 1, "gibbs sweep");
            }
        }

        Ok(Self {
            n_topics,
            alpha,
            beta,
            topic_term,
            topic_totals,
        })
    }

    pub fn n_topics(&self) -> usize {
        self.n_topics
    }

    pub fn n_terms(&self) -> usize {
        self.topic_term.ncols()
    }

    /// Smoothed probability of `term` under `topic`.
    pub fn term_weight(&self, topic: usize, term: usize) -> f64 {
        let v_beta = self.beta * self.n_terms() as f64;
        (f64::from(self.topic_term[[topic, term]]) + self.beta)
            / (self.topic_totals[topic] as f64 + v_beta)
    }

    /// Topic mixture of an unseen document by fold-in against the fitted
    /// topic-term distribution. Empty documents get the uniform mixture.
    pub fn infer(&self, doc: &[usize]) -> Vec<f64> {
        let k = self.n_topics;
        let mut theta = vec![1.0 / k as f64; k];
        if doc.is_empty() {
            return theta;
        }
        let denom = doc.len() as f64 + k as f64 * self.alpha;
        let mut resp = vec![0.0; k];
        for _ in 0..FOLD_IN_ITERATIONS {
            let mut acc = vec![0.0; k];
            for &w in doc {
                let mut sum = 0.0;
                for t in 0..k {
                    resp[t] = theta[t] * self.term_weight(t, w);
                    sum += resp[t];
                }
                for t in 0..k {
                    acc[t] += resp[t] / sum;
                }
            }
            for t in 0..k {
                theta[t] = (acc[t] + self.alpha) / denom;
            }
        }
        theta
    }

    /// The `top_n` highest-weight term indices per topic.
    pub fn top_terms(&self, top_n: usize) -> Vec<Vec<usize>> {
        self.topic_term
            .rows()
            .into_iter()
            .map(|row| {
                let mut idx: Vec<usize> = (0..row.len()).collect();
                idx.sort_by(|&a, &b| row[b].cmp(&row[a]).then(a.cmp(&b)));
                idx.truncate(top_n);
                idx
            })
            .collect()
    }
}

/// Everything needed to describe and assign topics, persisted as one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicBundle {
    pub model: Lda,
    pub vocabulary: Vocabulary,
    /// Top terms per topic, highest weight first.
    pub keywords: Vec<Vec<String>>,
}

impl TopicBundle {
    fn doc_ids(&self, text: &str) -> Vec<usize> {
        tokens(text)
            .iter()
            .filter_map(|t| self.vocabulary.get(t))
            .collect()
    }

    /// Topic mixture for one text.
    pub fn distribution(&self, text: &str) -> Vec<f64> {
        self.model.infer(&self.doc_ids(text))
    }

    /// Dominant topic per text, ties to the lowest topic id.
    pub fn assign<S: AsRef<str>>(&self, texts: &[S]) -> Vec<usize> {
        texts
            .iter()
            .map(|t| argmax(&self.distribution(t.as_ref())))
            .collect()
    }
}

/// Document count per topic id.
pub fn topic_counts(assignments: &[usize], n_topics: usize) -> Vec<usize> {
    let mut counts = vec![0; n_topics];
    for &t in assignments {
        if let Some(c) = counts.get_mut(t) {
            *c += 1;
        }
    }
    counts
}

/// Fits topic bundles from cleaned review text.
#[derive(Debug, Clone)]
pub struct TopicModeler {
    config: TopicConfig,
    vectorizer: CountVectorizer,
}

impl TopicModeler {
    pub fn new(config: &TopicConfig) -> Self {
        Self::with_vectorizer(config, CountVectorizer::new(config.max_features))
    }

    pub fn with_vectorizer(config: &TopicConfig, vectorizer: CountVectorizer) -> Self {
        Self {
            config: config.clone(),
            vectorizer,
        }
    }

    pub fn fit<S: AsRef<str>>(&self, texts: &[S]) -> Result<TopicBundle, TopicError> {
        self.fit_assign(texts).map(|(bundle, _)| bundle)
    }

    /// Fit a bundle and return the dominant topic of every input text.
    pub fn fit_assign<S: AsRef<str>>(
        &self,
        texts: &[S],
    ) -> Result<(TopicBundle, Vec<usize>), TopicError> {
        if self.config.n_topics == 0 {
            return Err(TopicError::InvalidTopicCount);
        }
        let vocabulary = self.vectorizer.fit(texts);
        if vocabulary.is_empty() {
            return Err(TopicError::EmptyVocabulary);
        }
        let docs: Vec<Vec<usize>> = texts
            .iter()
            .map(|t| self.vectorizer.token_ids(&vocabulary, t.as_ref()))
            .collect();

        let model = Lda::fit(
            &docs,
            vocabulary.len(),
            self.config.n_topics,
            self.config.iterations,
            self.config.seed,
        )?;
        let keywords = model
            .top_terms(self.config.top_n)
            .into_iter()
            .map(|ids| {
                ids.into_iter()
                    .filter_map(|i| vocabulary.term(i).map(str::to_string))
                    .collect()
            })
            .collect();

        info!(
            docs = docs.len(),
            vocabulary = vocabulary.len(),
            topics = self.config.n_topics,
            iterations = self.config.iterations,
            "fitted topic model"
        );
        let bundle = TopicBundle {
            model,
            vocabulary,
            keywords,
        };
        let assignments = bundle.assign(texts);
        Ok((bundle, assignments))
    }
}
