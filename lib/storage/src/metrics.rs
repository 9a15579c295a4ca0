use crate::tables::write_table;
use chocorec_cluster::Evaluation;
use chocorec_core::{Cell, Result, Table};
use std::path::Path;
use tracing::info;

/// Persist the model's quality metrics as a two-column `metric,value` CSV
pub fn write_metrics<P: AsRef<Path>>(path: P, evaluation: &Evaluation) -> Result<()> {
    let table = Table::with_rows(
        ["metric", "value"],
        vec![vec![
            Cell::from("silhouette_score"),
            Cell::Float(evaluation.silhouette),
        ]],
    )?;
    write_table(path.as_ref(), &table)?;
    info!("The performance metric is saved to path {:?}", path.as_ref());
    Ok(())
}
