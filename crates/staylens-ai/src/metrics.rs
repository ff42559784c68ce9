//! Evaluation reports for fitted classifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use staylens_core::Sentiment;

/// Precision, recall and F1 for one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: Sentiment,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Averages {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Counts indexed `[true][predicted]` over [`Sentiment::TRAINABLE`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub labels: Vec<Sentiment>,
    pub counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    /// Pairs where either side is `Unknown` are not counted.
    pub fn compute(truth: &[Sentiment], predicted: &[Sentiment]) -> Self {
        let labels = Sentiment::TRAINABLE.to_vec();
        let mut counts = vec![vec![0; labels.len()]; labels.len()];
        for (t, p) in truth.iter().zip(predicted) {
            if let (Some(ti), Some(pi)) = (t.class_index(), p.class_index()) {
                counts[ti][pi] += 1;
            }
        }
        Self { labels, counts }
    }

    pub fn get(&self, truth: Sentiment, predicted: Sentiment) -> usize {
        match (truth.class_index(), predicted.class_index()) {
            (Some(t), Some(p)) => self.counts[t][p],
            _ => 0,
        }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

/// Per-class and averaged metrics for one classifier variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub variant: String,
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: Averages,
    pub weighted_avg: Averages,
    pub support: usize,
    pub confusion: ConfusionMatrix,
}

impl ClassificationReport {
    pub fn compute(variant: impl Into<String>, truth: &[Sentiment], predicted: &[Sentiment]) -> Self {
        let confusion = ConfusionMatrix::compute(truth, predicted);
        let k = confusion.labels.len();
        let support = confusion.total();

        let classes: Vec<ClassMetrics> = (0..k)
            .map(|c| {
                let tp = confusion.counts[c][c];
                let row: usize = confusion.counts[c].iter().sum();
                let col: usize = confusion.counts.iter().map(|r| r[c]).sum();
                let precision = ratio(tp, col);
                let recall = ratio(tp, row);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassMetrics {
                    label: confusion.labels[c],
                    precision,
                    recall,
                    f1,
                    support: row,
                }
            })
            .collect();

        let correct: usize = (0..k).map(|c| confusion.counts[c][c]).sum();
        let mean = |f: fn(&ClassMetrics) -> f64| classes.iter().map(f).sum::<f64>() / k as f64;
        let weighted = |f: fn(&ClassMetrics) -> f64| {
            if support == 0 {
                0.0
            } else {
                classes.iter().map(|m| f(m) * m.support as f64).sum::<f64>() / support as f64
            }
        };
        let macro_avg = Averages {
            precision: mean(|m| m.precision),
            recall: mean(|m| m.recall),
            f1: mean(|m| m.f1),
        };
        let weighted_avg = Averages {
            precision: weighted(|m| m.precision),
            recall: weighted(|m| m.recall),
            f1: weighted(|m| m.f1),
        };

        Self {
            variant: variant.into(),
            accuracy: ratio(correct, support),
            classes,
            macro_avg,
            weighted_avg,
            support,
            confusion,
        }
    }

    pub fn labels(&self) -> Vec<Sentiment> {
        self.classes.iter().map(|m| m.label).collect()
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} ===", self.variant)?;
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for m in &self.classes {
            writeln!(
                f,
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                m.label.as_str(),
                m.precision,
                m.recall,
                m.f1,
                m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy", "", "", self.accuracy, self.support
        )?;
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                name, avg.precision, avg.recall, avg.f1, self.support
            )?;
        }
        writeln!(f)?;
        writeln!(f, "confusion matrix (rows = true, columns = predicted)")?;
        write!(f, "{:>10}", "")?;
        for label in &self.confusion.labels {
            write!(f, " {:>9}", label.as_str())?;
        }
        writeln!(f)?;
        for (label, row) in self.confusion.labels.iter().zip(&self.confusion.counts) {
            write!(f, "{:>10}", label.as_str())?;
            for c in row {
                write!(f, " {c:>9}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Sentiment::*;

    #[test]
    fn per_class_metrics() {
        let truth = [Positive, Positive, Positive, Negative, Negative, Neutral];
        let pred = [Positive, Positive, Negative, Negative, Positive, Neutral];
        let r = ClassificationReport::compute("logreg", &truth, &pred);

        assert_eq!(r.labels(), Sentiment::TRAINABLE.to_vec());
        assert_eq!(r.support, 6);
        assert!((r.accuracy - 4.0 / 6.0).abs() < 1e-12);

        let pos = &r.classes[2];
        assert_eq!(pos.support, 3);
        assert!((pos.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((pos.recall - 2.0 / 3.0).abs() < 1e-12);

        let neu = &r.classes[1];
        assert_eq!((neu.precision, neu.recall, neu.f1), (1.0, 1.0, 1.0));

        assert_eq!(r.confusion.get(Positive, Negative), 1);
        assert_eq!(r.confusion.get(Negative, Positive), 1);
        assert_eq!(r.confusion.get(Neutral, Neutral), 1);
    }

    #[test]
    fn averages() {
        let truth = [Positive, Positive, Negative, Neutral];
        let pred = [Positive, Positive, Positive, Positive];
        let r = ClassificationReport::compute("nb", &truth, &pred);
        // Only positive is ever predicted: precision 0.5, recall 1.
        let pos_f1 = 2.0 * 0.5 / 1.5;
        assert!((r.macro_avg.f1 - pos_f1 / 3.0).abs() < 1e-12);
        assert!((r.weighted_avg.f1 - pos_f1 * 0.5).abs() < 1e-12);
        assert!((r.weighted_avg.recall - 0.5).abs() < 1e-12);
    }

    #[test]
    fn empty_evaluation_set() {
        let r = ClassificationReport::compute("rf", &[], &[]);
        assert_eq!(r.support, 0);
        assert_eq!(r.accuracy, 0.0);
        assert_eq!(r.classes.len(), 3);
    }

    #[test]
    fn display_lists_every_class() {
        let r = ClassificationReport::compute("logreg", &[Positive, Neutral], &[Positive, Negative]);
        let text = r.to_string();
        for label in ["negative", "neutral", "positive", "macro avg", "confusion matrix"] {
            assert!(text.contains(label), "{label}");
        }
    }
}
