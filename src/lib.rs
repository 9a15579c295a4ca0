//! # chocorec
//!
//! A chocolate bar recommendation engine.
//!
//! chocorec clusters a product catalog with k-means over standardized
//! features, then answers a query by ranking the catalog entries that share
//! the query's cluster by distance.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! chocorec clean
//! chocorec train
//! chocorec recommend --cocoa-percent 72 --rating 4.5 --beans Yes --cocoa-butter No \
//!     --vanilla Yes --lecithin No --salt Yes --sugar Yes --sweetener-without-sugar No
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use chocorec::prelude::*;
//! use std::sync::Arc;
//!
//! let schema = FeatureSchema::chocolate_bars();
//! let catalog = read_table("data/clean.csv").unwrap();
//! let outcome = train(&catalog, &schema, &KMeans::new(10, 42)).unwrap();
//!
//! let query = ChocolateQuery {
//!     cocoa_percent: 72.0,
//!     rating: 4.5,
//!     beans: "Yes".into(),
//!     cocoa_butter: "No".into(),
//!     vanilla: "Yes".into(),
//!     lecithin: "No".into(),
//!     salt: "Yes".into(),
//!     sugar: "Yes".into(),
//!     sweetener_without_sugar: "No".into(),
//! };
//! let row = query.to_row(&schema, ProductId::SENTINEL, &default_yes_no_map()).unwrap();
//!
//! let params = RecommendParams::new(["company", "rating"], 5);
//! let recommender = Recommender::new(schema, Arc::new(outcome.model), params).unwrap();
//! let result = recommender.recommend(&catalog, &row).unwrap();
//! ```
//!
//! ## Crate Structure
//!
//! - `chocorec-core` - tables, feature schema, cleaning, standardization, distances
//! - `chocorec-cluster` - k-means, the cluster model, silhouette evaluation
//! - `chocorec-storage` - CSV tables, the model artifact, catalog snapshots
//! - `chocorec-recommend` - query injection, neighbor ranking, formatting

pub mod config;
pub mod pipeline;

// Re-export core types
pub use chocorec_core::{
    clean, CleanSpec, FlagEncoder, IndicatorMatch,
    Cell, ProductId, Table,
    FeatureDef, FeatureKind, FeatureSchema,
    Scaler,
    Error, Result,
};

// Re-export clustering
pub use chocorec_cluster::{train, ClusterModel, Evaluation, KMeans, TrainOutcome};

// Re-export storage
pub use chocorec_storage::{read_table, write_table, CatalogSource, CsvCatalog, ModelStore, SharedCatalog};

// Re-export recommendation
pub use chocorec_recommend::{
    build_query_row, default_yes_no_map, recommend,
    ChocolateQuery, QueryValue,
    DistanceSpace, RecommendParams, Recommender,
    Recommendation, RecommendationTable,
    CachedScaler, RecomputeOnRead, ScalerStrategy, ScalerStrategyKind,
};

pub use config::PipelineConfig;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Cell, ProductId, Table,
        FeatureSchema, Scaler,
        Error, Result,
        train, ClusterModel, KMeans,
        read_table, write_table, CatalogSource, ModelStore,
        default_yes_no_map, ChocolateQuery, QueryValue,
        RecommendParams, Recommender, RecommendationTable,
        PipelineConfig,
    };
}
