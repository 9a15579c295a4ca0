//! # chocorec Cluster
//!
//! Partitions the standardized feature space and assigns new points to it.
//!
//! - [`KMeans`] - seeded k-means++ / Lloyd clustering with restarts
//! - [`ClusterModel`] - the immutable fitted artifact (centroids, feature
//!   names, training scaler) with nearest-centroid prediction
//! - [`silhouette_score`] / [`evaluate`] - advisory quality gate
//! - [`train`] - standardize, fit and score in one step
//!
//! ## Example
//!
//! ```rust
//! use chocorec_cluster::KMeans;
//!
//! let data = vec![
//!     vec![1.0, 2.0],
//!     vec![1.5, 1.8],
//!     vec![8.0, 8.0],
//!     vec![9.0, 11.0],
//! ];
//! let fit = KMeans::new(2, 42).fit(&data).unwrap();
//! assert_eq!(fit.labels[0], fit.labels[1]);
//! assert_ne!(fit.labels[0], fit.labels[2]);
//! ```

pub mod kmeans;
pub mod model;
pub mod silhouette;
pub mod train;

pub use kmeans::{KMeans, KMeansFit};
pub use model::{ClusterModel, MODEL_FORMAT_VERSION};
pub use silhouette::{evaluate, silhouette_score, Evaluation, SILHOUETTE_THRESHOLD};
pub use train::{train, TrainOutcome};
