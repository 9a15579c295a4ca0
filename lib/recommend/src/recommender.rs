//! In-cluster nearest-neighbor recommendation
//!
//! A request runs the same steps every time:
//!
//! 1. project the catalog and the query row onto the schema's modeling columns
//! 2. standardize both with the scaler the [`ScalerStrategy`] supplies
//! 3. stack the query on top of the catalog and predict every row's cluster
//! 4. keep the rows sharing the query's cluster and rank them by distance
//! 5. join the ranked ids back to the display attributes
//!
//! The catalog is never mutated. All intermediate tables are request-local.

use crate::format::{format, RecommendationTable};
use crate::strategy::{RecomputeOnRead, ScalerStrategy};
use chocorec_cluster::ClusterModel;
use chocorec_core::distance::{argsort_take, pairwise_distances};
use chocorec_core::{Error, FeatureSchema, ProductId, Result, Table};
use chocorec_storage::{CatalogSource, ModelStore};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Feature space used to rank neighbors inside the query's cluster
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DistanceSpace {
    /// Unscaled feature values
    #[default]
    Raw,
    /// Values after the request's standardization
    Standardized,
}

fn default_sentinel() -> ProductId {
    ProductId::SENTINEL
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendParams {
    /// Attribute columns joined onto the result, besides the identifier
    pub display_columns: Vec<String>,
    pub top_n: usize,
    #[serde(default = "default_sentinel")]
    pub sentinel: ProductId,
    #[serde(default)]
    pub distance_space: DistanceSpace,
}

impl RecommendParams {
    pub fn new<S: Into<String>>(display_columns: impl IntoIterator<Item = S>, top_n: usize) -> Self {
        Self {
            display_columns: display_columns.into_iter().map(Into::into).collect(),
            top_n,
            sentinel: ProductId::SENTINEL,
            distance_space: DistanceSpace::default(),
        }
    }

    #[must_use]
    pub fn with_sentinel(mut self, sentinel: ProductId) -> Self {
        self.sentinel = sentinel;
        self
    }

    #[must_use]
    pub fn with_distance_space(mut self, space: DistanceSpace) -> Self {
        self.distance_space = space;
        self
    }
}

/// Ordered neighbors of one row, nearest first, the row itself included
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborRow {
    pub query: ProductId,
    pub neighbors: Vec<ProductId>,
}

/// Rank the members of the sentinel's cluster by distance
///
/// `ids`, `labels` and `points` are parallel, one entry per row. Every member
/// of the cluster gets its `top_n + 1` nearest members (itself included, so
/// it normally comes first); the sentinel's ranking is returned. Equal
/// distances keep row order.
pub fn rank_cluster_neighbors(
    ids: &[ProductId],
    labels: &[usize],
    points: &[Vec<f64>],
    sentinel: ProductId,
    top_n: usize,
) -> Result<NeighborRow> {
    if labels.len() != ids.len() || points.len() != ids.len() {
        return Err(Error::DimensionMismatch {
            expected: ids.len(),
            actual: labels.len().min(points.len()),
        });
    }

    let positions: Vec<usize> = ids
        .iter()
        .enumerate()
        .filter(|(_, id)| **id == sentinel)
        .map(|(i, _)| i)
        .collect();
    let position = match positions.as_slice() {
        [] => return Err(Error::SentinelNotFound(sentinel)),
        [only] => *only,
        many => {
            return Err(Error::SentinelDuplicated {
                id: sentinel,
                count: many.len(),
            })
        }
    };

    let label = labels[position];
    let members: Vec<usize> = (0..ids.len()).filter(|&i| labels[i] == label).collect();
    debug!(
        "Query {} falls in cluster {} with {} members",
        sentinel,
        label,
        members.len()
    );

    let cluster_points: Vec<Vec<f64>> = members.iter().map(|&i| points[i].clone()).collect();
    let distances = pairwise_distances(&cluster_points);

    let rankings: Vec<NeighborRow> = distances
        .par_iter()
        .zip(members.par_iter())
        .map(|(row, &member)| NeighborRow {
            query: ids[member],
            neighbors: argsort_take(row, top_n + 1)
                .into_iter()
                .map(|j| ids[members[j]])
                .collect(),
        })
        .collect();

    rankings
        .into_iter()
        .find(|row| row.query == sentinel)
        .ok_or(Error::SentinelNotFound(sentinel))
}

/// Recommends catalog products similar to a synthetic query row
pub struct Recommender {
    schema: FeatureSchema,
    model: Arc<ClusterModel>,
    strategy: Box<dyn ScalerStrategy>,
    params: RecommendParams,
}

impl Recommender {
    /// Pair a model with the schema it was trained on
    ///
    /// Fails if the model's features differ from the schema's, in name or
    /// order, or if `top_n` is zero.
    pub fn new(schema: FeatureSchema, model: Arc<ClusterModel>, params: RecommendParams) -> Result<Self> {
        schema.validate()?;
        schema.check_features(model.feature_names())?;
        if params.top_n == 0 {
            return Err(Error::InvalidConfig("top_n must be at least 1".to_string()));
        }
        Ok(Self {
            schema,
            model,
            strategy: Box::new(RecomputeOnRead),
            params,
        })
    }

    /// Load the model artifact from `store`
    pub fn from_store(schema: FeatureSchema, store: &ModelStore, params: RecommendParams) -> Result<Self> {
        let model = store.load()?;
        Self::new(schema, Arc::new(model), params)
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: Box<dyn ScalerStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn model(&self) -> &ClusterModel {
        &self.model
    }

    pub fn params(&self) -> &RecommendParams {
        &self.params
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Ranked neighbors of the query row within its cluster
    pub fn neighbors(&self, catalog: &Table, query_row: &Table) -> Result<NeighborRow> {
        let id_column = self.schema.id_column.as_str();
        let columns = self.schema.model_columns();
        let features = self.schema.feature_names();

        self.schema.check_table(catalog)?;
        self.schema.check_table(query_row)?;
        let modeling = catalog.project(&columns)?;
        let query = query_row.project(&columns)?;

        let scaler = self.strategy.scaler(&modeling, &features)?;
        let scaled = scaler.transform(&query)?.concat(&scaler.transform(&modeling)?)?;
        let combined = query.concat(&modeling)?;

        let labels = self.model.predict_table(&scaled)?;
        let ids = combined.ids(id_column)?;
        let points = match self.params.distance_space {
            DistanceSpace::Raw => combined.feature_matrix(&features)?,
            DistanceSpace::Standardized => scaled.feature_matrix(&features)?,
        };

        rank_cluster_neighbors(&ids, &labels, &points, self.params.sentinel, self.params.top_n)
    }

    /// Top-N recommendations for the query row, display attributes attached
    pub fn recommend(&self, catalog: &Table, query_row: &Table) -> Result<RecommendationTable> {
        let neighbors = self.neighbors(catalog, query_row)?;

        let id_column = self.schema.id_column.as_str();
        let display_columns: Vec<&str> = std::iter::once(id_column)
            .chain(
                self.params
                    .display_columns
                    .iter()
                    .map(String::as_str)
                    .filter(|c| *c != id_column),
            )
            .collect();
        let display = catalog.project(&display_columns)?;

        let result = format(&neighbors, &display, self.params.top_n, id_column)?;
        info!(
            "Recommended {} products using {} scaling",
            result.len(),
            self.strategy.name()
        );
        Ok(result)
    }

    /// Like [`Recommender::recommend`] against a fresh catalog snapshot
    pub fn recommend_from(&self, source: &dyn CatalogSource, query_row: &Table) -> Result<RecommendationTable> {
        let catalog = source.snapshot()?;
        self.recommend(&catalog, query_row)
    }
}

/// One-shot recommendation: load the model at `model_path` and rank
pub fn recommend<P: AsRef<Path>, S: AsRef<str>>(
    catalog: &Table,
    query_row: &Table,
    model_path: P,
    schema: &FeatureSchema,
    display_columns: &[S],
    top_n: usize,
) -> Result<RecommendationTable> {
    let params = RecommendParams::new(display_columns.iter().map(|c| c.as_ref().to_string()), top_n);
    Recommender::from_store(schema.clone(), &ModelStore::new(model_path), params)?.recommend(catalog, query_row)
}
