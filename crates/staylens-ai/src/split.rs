//! Stratified train/evaluation split.

use std::collections::BTreeMap;

use rand::prelude::*;
use staylens_core::Sentiment;

use crate::TrainError;

/// Smallest class size that can contribute to both partitions.
pub const MIN_CLASS_SIZE: usize = 2;

/// Row indices of each partition, ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split labelled rows so every class keeps its proportion in both parts.
///
/// Each class contributes `round(n_c * test_fraction)` evaluation rows,
/// clamped to `[1, n_c - 1]`. Rows labelled `Unknown` are left out of both
/// partitions.
pub fn stratified_split(
    labels: &[Sentiment],
    test_fraction: f64,
    seed: u64,
) -> Result<Split, TrainError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(TrainError::InvalidConfig(format!(
            "test_fraction {test_fraction} is not in (0, 1)"
        )));
    }

    let mut by_class: BTreeMap<Sentiment, Vec<usize>> = Sentiment::TRAINABLE
        .into_iter()
        .map(|c| (c, Vec::new()))
        .collect();
    for (i, label) in labels.iter().enumerate() {
        if let Some(members) = by_class.get_mut(label) {
            members.push(i);
        }
    }
    for (class, members) in &by_class {
        if members.len() < MIN_CLASS_SIZE {
            return Err(TrainError::InsufficientData {
                class: *class,
                count: members.len(),
                required: MIN_CLASS_SIZE,
            });
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();
    for (_, mut members) in by_class {
        members.shuffle(&mut rng);
        let n = members.len();
        let n_test = ((n as f64 * test_fraction).round() as usize).clamp(1, n - 1);
        test.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);
    }
    train.sort_unstable();
    test.sort_unstable();
    Ok(Split { train, test })
}

#[cfg(test)]
mod tests {
    use super::*;
    use Sentiment::*;

    fn labels(neg: usize, neu: usize, pos: usize) -> Vec<Sentiment> {
        let mut v = vec![Negative; neg];
        v.extend(vec![Neutral; neu]);
        v.extend(vec![Positive; pos]);
        v
    }

    fn count(split: &[usize], labels: &[Sentiment], class: Sentiment) -> usize {
        split.iter().filter(|&&i| labels[i] == class).count()
    }

    #[test]
    fn proportions_per_class() {
        let l = labels(10, 5, 85);
        let s = stratified_split(&l, 0.2, 42).unwrap();
        assert_eq!(count(&s.test, &l, Negative), 2);
        assert_eq!(count(&s.test, &l, Neutral), 1);
        assert_eq!(count(&s.test, &l, Positive), 17);
        assert_eq!(s.train.len() + s.test.len(), 100);
        assert!(s.test.iter().all(|i| !s.train.contains(i)));
    }

    #[test]
    fn tiny_classes_split_one_each_way() {
        let l = labels(2, 2, 2);
        let s = stratified_split(&l, 0.2, 1).unwrap();
        for class in Sentiment::TRAINABLE {
            assert_eq!(count(&s.test, &l, class), 1);
            assert_eq!(count(&s.train, &l, class), 1);
        }
    }

    #[test]
    fn seeded_and_unknown_excluded() {
        let mut l = labels(6, 6, 6);
        l.push(Unknown);
        let a = stratified_split(&l, 0.3, 7).unwrap();
        let b = stratified_split(&l, 0.3, 7).unwrap();
        assert_eq!(a, b);
        assert!(!a.train.contains(&18) && !a.test.contains(&18));
    }

    #[test]
    fn missing_or_singleton_class_rejected() {
        let err = stratified_split(&labels(5, 1, 5), 0.2, 42).unwrap_err();
        assert!(matches!(
            err,
            TrainError::InsufficientData { class: Neutral, count: 1, required: 2 }
        ));
        let err = stratified_split(&labels(5, 5, 0), 0.2, 42).unwrap_err();
        assert!(matches!(
            err,
            TrainError::InsufficientData { class: Positive, count: 0, .. }
        ));
    }

    #[test]
    fn fraction_must_be_open_interval() {
        for f in [0.0, 1.0, -0.1, f64::NAN] {
            assert!(matches!(
                stratified_split(&labels(3, 3, 3), f, 42),
                Err(TrainError::InvalidConfig(_))
            ));
        }
    }
}
