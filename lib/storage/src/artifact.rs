use crate::tables::write_atomic;
use chocorec_cluster::{ClusterModel, MODEL_FORMAT_VERSION};
use chocorec_core::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Single-file store for the cluster model
///
/// The artifact is written by a batch training step and read by request
/// handlers. Saving replaces the file atomically; there is no writer lock.
#[derive(Debug, Clone)]
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Serialize and persist, overwriting any previous artifact
    pub fn save(&self, model: &ClusterModel) -> Result<()> {
        let data = bincode::serialize(model)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        write_atomic(&self.path, &data)?;
        info!("K-means clustering model is saved to path {:?}", self.path);
        Ok(())
    }

    pub fn load(&self) -> Result<ClusterModel> {
        let data = std::fs::read(&self.path).map_err(|e| self.load_error(e.to_string()))?;
        let model: ClusterModel =
            bincode::deserialize(&data).map_err(|e| self.load_error(e.to_string()))?;

        if model.version() != MODEL_FORMAT_VERSION {
            return Err(self.load_error(format!(
                "unsupported format version {} (expected {})",
                model.version(),
                MODEL_FORMAT_VERSION
            )));
        }

        info!("Model is loaded from {:?}", self.path);
        Ok(model)
    }

    fn load_error(&self, reason: String) -> Error {
        Error::ArtifactLoad {
            path: self.path.clone(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chocorec_cluster::KMeans;
    use chocorec_core::{Cell, Scaler, Table};

    fn model() -> ClusterModel {
        let table = Table::with_rows(
            ["index", "x"],
            vec![
                vec![Cell::Int(1), Cell::Float(0.0)],
                vec![Cell::Int(2), Cell::Float(0.1)],
                vec![Cell::Int(3), Cell::Float(5.0)],
            ],
        )
        .unwrap();
        let scaler = Scaler::fit(&table, &["x"]).unwrap();
        let scaled = scaler.transform(&table).unwrap();
        ClusterModel::fit_with(&scaled, &["x"], &KMeans::new(2, 42))
            .unwrap()
            .with_scaler(scaler)
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("model.bin"));
        assert!(!store.exists());

        let model = model();
        store.save(&model).unwrap();
        assert!(store.exists());
        assert_eq!(store.load().unwrap(), model);
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("model.bin"));

        let first = ClusterModel::from_centroids(vec!["x".to_string()], vec![vec![0.0]]).unwrap();
        store.save(&first).unwrap();
        let second = model();
        store.save(&second).unwrap();
        assert_eq!(store.load().unwrap(), second);
    }

    #[test]
    fn test_missing_artifact_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.bin");
        let err = ModelStore::new(&path).load().unwrap_err();
        assert!(matches!(&err, Error::ArtifactLoad { path: p, .. } if *p == path));
        assert!(err.to_string().contains("absent.bin"));
    }

    #[test]
    fn test_garbage_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        std::fs::write(&path, b"not a model").unwrap();
        assert!(matches!(
            ModelStore::new(&path).load(),
            Err(Error::ArtifactLoad { .. })
        ));
    }
}
