use chocorec_cluster::ClusterModel;
use chocorec_core::{Error, Result, Scaler, Table};
use serde::{Deserialize, Serialize};

/// Where the recommender gets standardization parameters from
pub trait ScalerStrategy: Send + Sync {
    /// Scaler for `features` given the unscaled catalog of this request
    fn scaler(&self, catalog: &Table, features: &[&str]) -> Result<Scaler>;

    fn name(&self) -> &'static str;
}

/// Fit a fresh scaler on the live catalog for every request
///
/// The scaler always matches the catalog being ranked, at the cost of a
/// refit per request and possible drift from the training-time scaling.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecomputeOnRead;

impl ScalerStrategy for RecomputeOnRead {
    fn scaler(&self, catalog: &Table, features: &[&str]) -> Result<Scaler> {
        Scaler::fit(catalog, features)
    }

    fn name(&self) -> &'static str {
        "recompute_on_read"
    }
}

/// Reuse the scaler the model was trained with
#[derive(Debug, Clone)]
pub struct CachedScaler {
    scaler: Scaler,
}

impl CachedScaler {
    pub fn new(scaler: Scaler) -> Self {
        Self { scaler }
    }

    pub fn from_model(model: &ClusterModel) -> Result<Self> {
        model.scaler().cloned().map(Self::new).ok_or_else(|| {
            Error::InvalidConfig("cluster model carries no trained scaler".to_string())
        })
    }
}

impl ScalerStrategy for CachedScaler {
    fn scaler(&self, _catalog: &Table, features: &[&str]) -> Result<Scaler> {
        let columns = self.scaler.columns();
        if columns.len() != features.len() {
            return Err(Error::DimensionMismatch {
                expected: features.len(),
                actual: columns.len(),
            });
        }
        if let Some((_, wanted)) = columns.iter().zip(features).find(|(have, want)| have != want) {
            return Err(Error::missing_column(*wanted));
        }
        Ok(self.scaler.clone())
    }

    fn name(&self) -> &'static str {
        "cache_trained_scaler"
    }
}

/// Configurable selector for a [`ScalerStrategy`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScalerStrategyKind {
    #[default]
    RecomputeOnRead,
    CacheTrainedScaler,
}

impl ScalerStrategyKind {
    pub fn build(self, model: &ClusterModel) -> Result<Box<dyn ScalerStrategy>> {
        Ok(match self {
            ScalerStrategyKind::RecomputeOnRead => Box::new(RecomputeOnRead),
            ScalerStrategyKind::CacheTrainedScaler => Box::new(CachedScaler::from_model(model)?),
        })
    }
}
