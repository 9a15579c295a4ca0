use crate::kmeans::{nearest_centroid, KMeans};
use chocorec_core::{Error, Result, Scaler, Table};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Format version written into every persisted model
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// A fitted k-means partition of the standardized feature space
///
/// Immutable once fitted. Carries the ordered feature names it was trained
/// on so a caller with a different schema is rejected instead of silently
/// mislabeled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClusterModel {
    version: u32,
    feature_names: Vec<String>,
    centroids: Vec<Vec<f64>>,
    /// Labels of the training rows, in row order
    labels: Vec<usize>,
    inertia: f64,
    n_iter: usize,
    seed: Option<u64>,
    /// Scaler fitted on the training catalog
    scaler: Option<Scaler>,
}

impl ClusterModel {
    /// Fit `k` clusters over `feature_columns` of an already standardized table
    pub fn fit<S: AsRef<str>>(
        scaled: &Table,
        feature_columns: &[S],
        k: usize,
        seed: u64,
    ) -> Result<Self> {
        Self::fit_with(scaled, feature_columns, &KMeans::new(k, seed))
    }

    pub fn fit_with<S: AsRef<str>>(
        scaled: &Table,
        feature_columns: &[S],
        kmeans: &KMeans,
    ) -> Result<Self> {
        let matrix = scaled.feature_matrix(feature_columns)?;
        let fit = kmeans.fit(&matrix)?;

        info!(
            "Fitted {} clusters over {} rows in {} iterations (inertia {:.4})",
            kmeans.n_clusters,
            matrix.len(),
            fit.n_iter,
            fit.inertia
        );

        Ok(Self {
            version: MODEL_FORMAT_VERSION,
            feature_names: feature_columns.iter().map(|c| c.as_ref().to_string()).collect(),
            centroids: fit.centroids,
            labels: fit.labels,
            inertia: fit.inertia,
            n_iter: fit.n_iter,
            seed: Some(kmeans.seed),
            scaler: None,
        })
    }

    /// Build a model from known centroids
    pub fn from_centroids(feature_names: Vec<String>, centroids: Vec<Vec<f64>>) -> Result<Self> {
        if centroids.is_empty() {
            return Err(Error::InvalidConfig("a model needs at least one centroid".to_string()));
        }
        if let Some(bad) = centroids.iter().find(|c| c.len() != feature_names.len()) {
            return Err(Error::DimensionMismatch {
                expected: feature_names.len(),
                actual: bad.len(),
            });
        }

        Ok(Self {
            version: MODEL_FORMAT_VERSION,
            feature_names,
            centroids,
            labels: Vec::new(),
            inertia: 0.0,
            n_iter: 0,
            seed: None,
            scaler: None,
        })
    }

    /// Attach the scaler the training matrix was standardized with
    #[must_use]
    pub fn with_scaler(mut self, scaler: Scaler) -> Self {
        self.scaler = Some(scaler);
        self
    }

    /// Assign every row to its nearest centroid
    pub fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<usize>> {
        let dim = self.dim();
        rows.iter()
            .map(|row| {
                if row.len() != dim {
                    return Err(Error::DimensionMismatch {
                        expected: dim,
                        actual: row.len(),
                    });
                }
                Ok(nearest_centroid(row, &self.centroids).0)
            })
            .collect()
    }

    /// Predict over the model's feature columns of a standardized table
    pub fn predict_table(&self, table: &Table) -> Result<Vec<usize>> {
        let matrix = table.feature_matrix(&self.feature_names)?;
        self.predict(&matrix)
    }

    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.feature_names.len()
    }

    #[inline]
    pub fn n_clusters(&self) -> usize {
        self.centroids.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn centroids(&self) -> &[Vec<f64>] {
        &self.centroids
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn scaler(&self) -> Option<&Scaler> {
        self.scaler.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chocorec_core::Cell;

    fn scaled_table() -> Table {
        let rows = [
            (0, -1.0, -1.0),
            (1, -1.1, -0.9),
            (2, 1.0, 1.0),
            (3, 0.9, 1.2),
        ];
        Table::with_rows(
            ["index", "x", "y"],
            rows.iter()
                .map(|&(id, x, y)| vec![Cell::Int(id), Cell::Float(x), Cell::Float(y)])
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_fit_and_predict() {
        let model = ClusterModel::fit(&scaled_table(), &["x", "y"], 2, 42).unwrap();
        assert_eq!(model.n_clusters(), 2);
        assert_eq!(model.labels().len(), 4);
        assert_eq!(model.seed(), Some(42));

        let labels = model.predict(&[vec![-1.0, -1.0], vec![1.0, 1.0]]).unwrap();
        assert_eq!(labels[0], model.labels()[0]);
        assert_eq!(labels[1], model.labels()[2]);
        assert_ne!(labels[0], labels[1]);
    }

    #[test]
    fn test_predict_table_matches_training_labels() {
        let table = scaled_table();
        let model = ClusterModel::fit(&table, &["x", "y"], 2, 7).unwrap();
        assert_eq!(model.predict_table(&table).unwrap(), model.labels());
    }

    #[test]
    fn test_predict_rejects_wrong_dimension() {
        let model = ClusterModel::from_centroids(
            vec!["x".to_string(), "y".to_string()],
            vec![vec![0.0, 0.0]],
        )
        .unwrap();
        assert!(matches!(
            model.predict(&[vec![1.0]]),
            Err(Error::DimensionMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_predict_table_missing_feature() {
        let model = ClusterModel::from_centroids(vec!["z".to_string()], vec![vec![0.0]]).unwrap();
        assert!(matches!(
            model.predict_table(&scaled_table()),
            Err(Error::SchemaMismatch { column }) if column == "z"
        ));
    }

    #[test]
    fn test_from_centroids_validates() {
        assert!(ClusterModel::from_centroids(vec!["x".to_string()], vec![]).is_err());
        assert!(ClusterModel::from_centroids(vec!["x".to_string()], vec![vec![0.0, 1.0]]).is_err());
    }
}
