// Delimited-file persistence for tables
use atomicwrites::{AllowOverwrite, AtomicFile};
use chocorec_core::{Cell, Error, Result, Table};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Read a comma-separated file with a header row
///
/// Fields are typed per cell: integer, then float, then text.
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::MissingSource {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(csv_error)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut table = Table::new(headers);
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        table.push_row(record.iter().map(Cell::parse).collect())?;
    }

    info!("Read {} rows from {:?}", table.len(), path);
    Ok(table)
}

/// Write a table as CSV, replacing any existing file atomically
pub fn write_table<P: AsRef<Path>>(path: P, table: &Table) -> Result<()> {
    let path = path.as_ref();
    let bytes = encode_csv(table)?;
    write_atomic(path, &bytes)?;
    info!("Data is saved to path {:?}", path);
    Ok(())
}

pub(crate) fn encode_csv(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.columns()).map_err(csv_error)?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(|c| c.to_string()))
            .map_err(csv_error)?;
    }
    writer
        .into_inner()
        .map_err(|e| Error::Csv(e.to_string()))
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    AtomicFile::new(path, AllowOverwrite)
        .write(|f| f.write_all(bytes))
        .map_err(|e| Error::ArtifactWrite {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

fn csv_error(e: csv::Error) -> Error {
    Error::Csv(e.to_string())
}
