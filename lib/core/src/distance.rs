//! Euclidean distances over dense feature rows

use ordered_float::OrderedFloat;
use rayon::prelude::*;

/// Squared L2 distance (two accumulators for better pipelining)
#[inline]
pub fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());

    let mut sum0 = 0.0f64;
    let mut sum1 = 0.0f64;

    let chunks = a.chunks_exact(4);
    let remainder = chunks.remainder();
    let b_chunks = b.chunks_exact(4);

    for (a_chunk, b_chunk) in chunks.zip(b_chunks) {
        let d0 = a_chunk[0] - b_chunk[0];
        let d1 = a_chunk[1] - b_chunk[1];
        let d2 = a_chunk[2] - b_chunk[2];
        let d3 = a_chunk[3] - b_chunk[3];

        sum0 += d0 * d0 + d1 * d1;
        sum1 += d2 * d2 + d3 * d3;
    }

    for i in (a.len() - remainder.len())..a.len() {
        let diff = a[i] - b[i];
        sum0 += diff * diff;
    }

    sum0 + sum1
}

#[inline]
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    squared_euclidean(a, b).sqrt()
}

/// Full symmetric distance matrix; rows are computed in parallel
pub fn pairwise_distances(points: &[Vec<f64>]) -> Vec<Vec<f64>> {
    points
        .par_iter()
        .map(|p| points.iter().map(|q| euclidean(p, q)).collect())
        .collect()
}

/// Indices of the `take` smallest entries of `row`, ascending
///
/// The sort is stable, so equal distances keep their index order.
pub fn argsort_take(row: &[f64], take: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..row.len()).collect();
    order.sort_by_key(|&i| OrderedFloat(row[i]));
    order.truncate(take);
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean() {
        assert!((euclidean(&[0.0, 0.0], &[3.0, 4.0]) - 5.0).abs() < 1e-12);
        // Exercise the unrolled path plus remainder
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [0.0, 0.0, 0.0, 0.0, 0.0];
        assert!((squared_euclidean(&a, &b) - 55.0).abs() < 1e-12);
    }

    #[test]
    fn test_pairwise_is_symmetric() {
        let points = vec![vec![0.0, 0.0], vec![3.0, 4.0], vec![6.0, 8.0]];
        let m = pairwise_distances(&points);
        for i in 0..3 {
            assert_eq!(m[i][i], 0.0);
            for j in 0..3 {
                assert_eq!(m[i][j], m[j][i]);
            }
        }
        assert!((m[0][2] - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_argsort_take() {
        assert_eq!(argsort_take(&[0.5, 0.0, 2.0, 0.1], 3), vec![1, 3, 0]);
        assert_eq!(argsort_take(&[1.0, 1.0, 0.0], 5), vec![2, 0, 1]);
    }
}
