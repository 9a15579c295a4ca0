//! Silhouette-based evaluation of a fitted partition
//!
//! The silhouette of a sample is `s = (b - a) / max(a, b)`:
//! - `a`: mean distance to the other members of its own cluster
//! - `b`: mean distance to the members of the nearest other cluster
//!
//! The score is advisory. Training never fails because of it.

use chocorec_core::distance::euclidean;
use chocorec_core::{Error, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Scores at or above this are considered a usable partition
pub const SILHOUETTE_THRESHOLD: f64 = 0.4;

/// Mean silhouette coefficient over all samples, in [-1, 1]
///
/// Requires between 2 and `n - 1` distinct labels. Samples in a singleton
/// cluster contribute 0.
pub fn silhouette_score(data: &[Vec<f64>], labels: &[usize]) -> Result<f64> {
    if data.len() != labels.len() {
        return Err(Error::DimensionMismatch {
            expected: data.len(),
            actual: labels.len(),
        });
    }

    let n = data.len();
    let slots = labels.iter().max().map_or(0, |m| m + 1);
    let mut counts = vec![0usize; slots];
    for &l in labels {
        counts[l] += 1;
    }

    let n_labels = counts.iter().filter(|&&c| c > 0).count();
    if n_labels < 2 || n_labels >= n {
        return Err(Error::InvalidConfig(format!(
            "silhouette needs 2..={} distinct labels, got {}",
            n.saturating_sub(1),
            n_labels
        )));
    }

    let total: f64 = (0..n)
        .into_par_iter()
        .map(|i| {
            let own = labels[i];
            if counts[own] < 2 {
                return 0.0;
            }

            let mut sums = vec![0.0; slots];
            for j in 0..n {
                if j != i {
                    sums[labels[j]] += euclidean(&data[i], &data[j]);
                }
            }

            let a = sums[own] / (counts[own] - 1) as f64;
            let b = (0..slots)
                .filter(|&l| l != own && counts[l] > 0)
                .map(|l| sums[l] / counts[l] as f64)
                .fold(f64::INFINITY, f64::min);

            let denom = a.max(b);
            if denom > 0.0 {
                (b - a) / denom
            } else {
                0.0
            }
        })
        .sum();

    Ok(total / n as f64)
}

/// Outcome of evaluating a fitted model
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Evaluation {
    pub silhouette: f64,
}

impl Evaluation {
    pub fn is_acceptable(&self) -> bool {
        self.silhouette >= SILHOUETTE_THRESHOLD
    }
}

/// Score a partition and report the result through the log
pub fn evaluate(data: &[Vec<f64>], labels: &[usize]) -> Result<Evaluation> {
    let evaluation = Evaluation {
        silhouette: silhouette_score(data, labels)?,
    };

    if evaluation.is_acceptable() {
        info!("The model has silhouette score {:.6}", evaluation.silhouette);
    } else {
        warn!(
            "The model has silhouette score {:.6} and may not distinguish different products well",
            evaluation.silhouette
        );
    }

    Ok(evaluation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_separated_clusters_score_high() {
        let data = vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![10.0, 10.0],
            vec![10.0, 11.0],
        ];
        let score = silhouette_score(&data, &[0, 0, 1, 1]).unwrap();
        assert!(score > 0.9);
        assert!(evaluate(&data, &[0, 0, 1, 1]).unwrap().is_acceptable());
    }

    #[test]
    fn test_hand_computed_score() {
        // Points on a line: 0, 1 | 4
        // s(0) = (4 - 1) / 4, s(1) = (3 - 1) / 3, s(4) = 0 (singleton)
        let data = vec![vec![0.0], vec![1.0], vec![4.0]];
        let score = silhouette_score(&data, &[0, 0, 1]).unwrap();
        let expected = (0.75 + 2.0 / 3.0 + 0.0) / 3.0;
        assert!((score - expected).abs() < 1e-12);
    }

    #[test]
    fn test_bad_assignment_scores_negative() {
        let data = vec![
            vec![0.0],
            vec![10.0],
            vec![0.5],
            vec![10.5],
        ];
        let score = silhouette_score(&data, &[0, 0, 1, 1]).unwrap();
        assert!(score < 0.0);
        assert!(!evaluate(&data, &[0, 0, 1, 1]).unwrap().is_acceptable());
    }

    #[test]
    fn test_label_count_bounds() {
        let data = vec![vec![0.0], vec![1.0], vec![2.0]];
        assert!(silhouette_score(&data, &[0, 0, 0]).is_err());
        assert!(silhouette_score(&data, &[0, 1, 2]).is_err());
        assert!(silhouette_score(&data, &[0, 1]).is_err());
    }

    #[test]
    fn test_sparse_labels() {
        // Labels need not be contiguous
        let data = vec![vec![0.0], vec![0.1], vec![5.0], vec![5.1]];
        let score = silhouette_score(&data, &[2, 2, 8, 8]).unwrap();
        assert!(score > 0.9);
    }
}
