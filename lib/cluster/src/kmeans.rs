//! K-Means clustering
//!
//! Lloyd's algorithm with k-means++ initialization. Several seeded restarts
//! are run and the one with the lowest inertia is kept.

use chocorec_core::distance::squared_euclidean;
use chocorec_core::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// K-Means hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KMeans {
    /// Number of clusters
    pub n_clusters: usize,
    /// Seed for centroid initialization
    pub seed: u64,
    /// Maximum Lloyd iterations per restart
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
    /// Convergence threshold on the total squared centroid shift
    #[serde(default = "default_tol")]
    pub tol: f64,
    /// Number of restarts
    #[serde(default = "default_n_init")]
    pub n_init: usize,
}

fn default_max_iter() -> usize {
    300
}

fn default_tol() -> f64 {
    1e-4
}

fn default_n_init() -> usize {
    10
}

/// Result of a fit
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    pub centroids: Vec<Vec<f64>>,
    pub labels: Vec<usize>,
    /// Sum of squared distances of samples to their centroid
    pub inertia: f64,
    pub n_iter: usize,
}

impl KMeans {
    pub fn new(n_clusters: usize, seed: u64) -> Self {
        Self {
            n_clusters,
            seed,
            max_iter: default_max_iter(),
            tol: default_tol(),
            n_init: default_n_init(),
        }
    }

    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    #[must_use]
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    #[must_use]
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    pub fn fit(&self, data: &[Vec<f64>]) -> Result<KMeansFit> {
        self.validate(data)?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best: Option<KMeansFit> = None;

        for _ in 0..self.n_init {
            let run = self.run_once(data, &mut rng);
            if best.as_ref().map_or(true, |b| run.inertia < b.inertia) {
                best = Some(run);
            }
        }

        best.ok_or_else(|| Error::InvalidConfig("n_init must be at least 1".to_string()))
    }

    fn validate(&self, data: &[Vec<f64>]) -> Result<()> {
        if data.is_empty() {
            return Err(Error::EmptyTable);
        }
        if self.n_clusters == 0 || self.n_clusters > data.len() {
            return Err(Error::InvalidConfig(format!(
                "n_clusters must be in 1..={}, got {}",
                data.len(),
                self.n_clusters
            )));
        }
        if self.n_init == 0 {
            return Err(Error::InvalidConfig("n_init must be at least 1".to_string()));
        }

        let dim = data[0].len();
        if let Some(bad) = data.iter().find(|row| row.len() != dim) {
            return Err(Error::DimensionMismatch {
                expected: dim,
                actual: bad.len(),
            });
        }
        Ok(())
    }

    fn run_once(&self, data: &[Vec<f64>], rng: &mut StdRng) -> KMeansFit {
        let mut centroids = init_plus_plus(data, self.n_clusters, rng);
        let mut n_iter = 0;

        for _ in 0..self.max_iter {
            n_iter += 1;
            let assigned = assign(data, &centroids);
            let updated = update_centroids(data, &assigned, self.n_clusters);

            let shift: f64 = centroids
                .iter()
                .zip(&updated)
                .map(|(old, new)| squared_euclidean(old, new))
                .sum();
            centroids = updated;

            if shift <= self.tol {
                break;
            }
        }

        let assigned = assign(data, &centroids);
        KMeansFit {
            inertia: assigned.iter().map(|(_, d)| d).sum(),
            labels: assigned.into_iter().map(|(l, _)| l).collect(),
            centroids,
            n_iter,
        }
    }
}

/// Nearest centroid and squared distance to it; ties go to the lowest label
#[inline]
pub fn nearest_centroid(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (label, centroid) in centroids.iter().enumerate() {
        let d = squared_euclidean(point, centroid);
        if d < best.1 {
            best = (label, d);
        }
    }
    best
}

fn assign(data: &[Vec<f64>], centroids: &[Vec<f64>]) -> Vec<(usize, f64)> {
    data.par_iter()
        .map(|p| nearest_centroid(p, centroids))
        .collect()
}

fn update_centroids(data: &[Vec<f64>], assigned: &[(usize, f64)], k: usize) -> Vec<Vec<f64>> {
    let dim = data[0].len();
    let mut sums = vec![vec![0.0; dim]; k];
    let mut counts = vec![0usize; k];

    for (point, &(label, _)) in data.iter().zip(assigned) {
        counts[label] += 1;
        for (s, x) in sums[label].iter_mut().zip(point) {
            *s += x;
        }
    }

    // Empty clusters take the points that sit farthest from their centroid
    let mut farthest: Vec<usize> = (0..data.len()).collect();
    farthest.sort_by(|&a, &b| assigned[b].1.total_cmp(&assigned[a].1));
    let mut donors = farthest.into_iter();

    sums.into_iter()
        .zip(counts)
        .map(|(sum, count)| {
            if count > 0 {
                sum.into_iter().map(|s| s / count as f64).collect()
            } else {
                donors
                    .next()
                    .map(|i| data[i].clone())
                    .unwrap_or_else(|| vec![0.0; dim])
            }
        })
        .collect()
}

/// k-means++ seeding: each new centroid is drawn with probability
/// proportional to its squared distance from the closest chosen one
fn init_plus_plus(data: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let n = data.len();
    let mut centroids = Vec::with_capacity(k);
    centroids.push(data[rng.random_range(0..n)].clone());

    let mut closest: Vec<f64> = data
        .iter()
        .map(|p| squared_euclidean(p, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = closest.iter().sum();
        let next = if total > 0.0 {
            let target = rng.random::<f64>() * total;
            let mut acc = 0.0;
            closest
                .iter()
                .position(|d| {
                    acc += d;
                    acc > target
                })
                .unwrap_or(n - 1)
        } else {
            rng.random_range(0..n)
        };

        let chosen = data[next].clone();
        for (c, p) in closest.iter_mut().zip(data) {
            *c = c.min(squared_euclidean(p, &chosen));
        }
        centroids.push(chosen);
    }

    centroids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> Vec<Vec<f64>> {
        vec![
            vec![1.0, 2.0],
            vec![1.5, 1.8],
            vec![1.0, 0.6],
            vec![8.0, 8.0],
            vec![9.0, 11.0],
            vec![8.5, 9.5],
        ]
    }

    #[test]
    fn test_separates_two_blobs() {
        let fit = KMeans::new(2, 42).fit(&blobs()).unwrap();
        assert_eq!(fit.labels.len(), 6);
        assert_eq!(fit.labels[0], fit.labels[1]);
        assert_eq!(fit.labels[1], fit.labels[2]);
        assert_eq!(fit.labels[3], fit.labels[4]);
        assert_eq!(fit.labels[4], fit.labels[5]);
        assert_ne!(fit.labels[0], fit.labels[3]);
    }

    #[test]
    fn test_same_seed_same_result() {
        let a = KMeans::new(3, 7).fit(&blobs()).unwrap();
        let b = KMeans::new(3, 7).fit(&blobs()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_k_equals_n_has_zero_inertia() {
        let fit = KMeans::new(6, 1).fit(&blobs()).unwrap();
        assert!(fit.inertia.abs() < 1e-12);
    }

    #[test]
    fn test_invalid_k() {
        assert!(matches!(
            KMeans::new(0, 1).fit(&blobs()),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            KMeans::new(7, 1).fit(&blobs()),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(KMeans::new(1, 1).fit(&[]), Err(Error::EmptyTable)));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let data = vec![vec![1.0, 2.0], vec![1.0]];
        assert!(matches!(
            KMeans::new(1, 1).fit(&data),
            Err(Error::DimensionMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_identical_points() {
        let data = vec![vec![1.0, 1.0]; 4];
        let fit = KMeans::new(2, 3).fit(&data).unwrap();
        assert_eq!(fit.centroids.len(), 2);
        assert!(fit.inertia.abs() < 1e-12);
    }

    #[test]
    fn test_nearest_centroid_tie_goes_low() {
        let centroids = vec![vec![0.0], vec![2.0]];
        assert_eq!(nearest_centroid(&[1.0], &centroids).0, 0);
        assert_eq!(nearest_centroid(&[1.5], &centroids).0, 1);
    }
}
