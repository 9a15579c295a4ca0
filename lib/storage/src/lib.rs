pub mod artifact;
pub mod catalog;
pub mod metrics;
pub mod tables;

pub use artifact::ModelStore;
pub use catalog::{CatalogSource, CsvCatalog, SharedCatalog};
pub use metrics::write_metrics;
pub use tables::{read_table, write_table};
