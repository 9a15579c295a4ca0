//! # chocorec Recommend
//!
//! Turns a user's product description into a ranked list of catalog
//! products from the same cluster.
//!
//! - [`build_query_row`] / [`ChocolateQuery`] - the synthetic query row
//! - [`ScalerStrategy`] - where standardization parameters come from
//! - [`Recommender`] - cluster assignment and in-cluster neighbor ranking
//! - [`format`] - drop the query, join display attributes, assign ranks

pub mod format;
pub mod query;
pub mod recommender;
pub mod strategy;

pub use format::{format, Recommendation, RecommendationTable, PRODUCT_COLUMN, RANK_COLUMN};
pub use query::{build_query_row, default_yes_no_map, ChocolateQuery, QueryValue, YesNoMap};
pub use recommender::{
    rank_cluster_neighbors, recommend, DistanceSpace, NeighborRow, RecommendParams, Recommender,
};
pub use strategy::{CachedScaler, RecomputeOnRead, ScalerStrategy, ScalerStrategyKind};
