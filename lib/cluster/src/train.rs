use crate::kmeans::KMeans;
use crate::model::ClusterModel;
use crate::silhouette::{evaluate, Evaluation};
use chocorec_core::{FeatureSchema, Result, Scaler, Table};
use tracing::{info, warn};

/// A trained model and its advisory quality score
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub model: ClusterModel,
    /// `None` when the partition cannot be scored (e.g. a single cluster)
    pub evaluation: Option<Evaluation>,
}

/// Standardize a clean catalog and fit a cluster model over it
///
/// The fitted scaler travels with the model so prediction can reuse it.
pub fn train(clean: &Table, schema: &FeatureSchema, kmeans: &KMeans) -> Result<TrainOutcome> {
    schema.validate()?;
    schema.check_table(clean)?;

    let features = schema.feature_names();
    let scaler = Scaler::fit(clean, &features)?;
    let scaled = scaler.transform(clean)?;

    info!(
        "Training on {} rows, {} features, k = {}, seed = {}",
        clean.len(),
        features.len(),
        kmeans.n_clusters,
        kmeans.seed
    );

    let model = ClusterModel::fit_with(&scaled, &features, kmeans)?.with_scaler(scaler);

    let matrix = scaled.feature_matrix(&features)?;
    let evaluation = match evaluate(&matrix, model.labels()) {
        Ok(evaluation) => Some(evaluation),
        Err(e) => {
            warn!("Silhouette score could not be computed: {}", e);
            None
        }
    };

    Ok(TrainOutcome { model, evaluation })
}
