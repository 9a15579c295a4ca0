//! # chocorec Core
//!
//! Core library for the chocorec recommendation engine.
//!
//! This crate provides the data structures every later stage builds on:
//!
//! - [`Table`] - Row-major table of [`Cell`]s keyed by column name
//! - [`FeatureSchema`] - Ordered modeling features shared by all stages
//! - [`clean`] - Flag encoding and column projection of a raw catalog
//! - [`Scaler`] - Zero-mean, unit-variance standardization
//! - [`distance`] - Euclidean distances and neighbor ordering
//!
//! ## Example
//!
//! ```rust
//! use chocorec_core::{Cell, Scaler, Table};
//!
//! let table = Table::with_rows(
//!     ["index", "rating"],
//!     vec![
//!         vec![Cell::Int(1), Cell::Float(3.0)],
//!         vec![Cell::Int(2), Cell::Float(4.0)],
//!     ],
//! ).unwrap();
//!
//! let scaled = Scaler::fit_transform(&table, &["rating"]).unwrap();
//! assert_eq!(scaled.numeric_column("rating").unwrap(), vec![-1.0, 1.0]);
//! ```

pub mod distance;
pub mod encode;
pub mod error;
pub mod scale;
pub mod schema;
pub mod table;

pub use encode::{clean, CleanSpec, FlagEncoder, IndicatorMatch};
pub use error::{Error, Result};
pub use scale::Scaler;
pub use schema::{FeatureDef, FeatureKind, FeatureSchema};
pub use table::{Cell, ProductId, Table};
