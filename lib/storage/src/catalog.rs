//! Read access to the product catalog
//!
//! Every request works on an immutable snapshot. Nothing downstream of
//! [`CatalogSource::snapshot`] can mutate the catalog.

use crate::tables::read_table;
use chocorec_core::{Result, Table};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub trait CatalogSource: Send + Sync {
    /// Consistent view of the catalog for one request
    fn snapshot(&self) -> Result<Arc<Table>>;
}

/// Catalog backed by a cleaned CSV file, re-read on every snapshot
#[derive(Debug, Clone)]
pub struct CsvCatalog {
    path: PathBuf,
}

impl CsvCatalog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for CsvCatalog {
    fn snapshot(&self) -> Result<Arc<Table>> {
        read_table(&self.path).map(Arc::new)
    }
}

/// In-memory catalog that can be swapped while readers hold older snapshots
#[derive(Debug, Default)]
pub struct SharedCatalog {
    current: RwLock<Arc<Table>>,
}

impl SharedCatalog {
    pub fn new(table: Table) -> Self {
        Self {
            current: RwLock::new(Arc::new(table)),
        }
    }

    /// Publish a new catalog version; outstanding snapshots are unaffected
    pub fn replace(&self, table: Table) {
        *self.current.write() = Arc::new(table);
    }

    pub fn len(&self) -> usize {
        self.current.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.read().is_empty()
    }
}

impl CatalogSource for SharedCatalog {
    fn snapshot(&self) -> Result<Arc<Table>> {
        Ok(Arc::clone(&self.current.read()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::write_table;
    use chocorec_core::{Cell, Error};

    fn table(n: i64) -> Table {
        Table::with_rows(
            ["index"],
            (0..n).map(|i| vec![Cell::Int(i)]).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_shared_snapshot_survives_replace() {
        let catalog = SharedCatalog::new(table(2));
        let before = catalog.snapshot().unwrap();

        catalog.replace(table(5));

        assert_eq!(before.len(), 2);
        assert_eq!(catalog.snapshot().unwrap().len(), 5);
        assert_eq!(catalog.len(), 5);
    }

    #[test]
    fn test_csv_catalog_reads_current_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clean.csv");
        let catalog = CsvCatalog::new(&path);

        assert!(matches!(catalog.snapshot(), Err(Error::MissingSource { .. })));

        write_table(&path, &table(3)).unwrap();
        assert_eq!(catalog.snapshot().unwrap().len(), 3);
    }

    #[test]
    fn test_sources_are_object_safe() {
        let sources: Vec<Box<dyn CatalogSource>> = vec![
            Box::new(SharedCatalog::new(table(1))),
            Box::new(CsvCatalog::new("does-not-exist.csv")),
        ];
        assert!(sources[0].snapshot().is_ok());
        assert!(sources[1].snapshot().is_err());
    }
}
