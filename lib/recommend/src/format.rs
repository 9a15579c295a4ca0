use crate::recommender::NeighborRow;
use chocorec_core::{Cell, ProductId, Result, Table};
use serde::Serialize;
use tracing::debug;

pub const RANK_COLUMN: &str = "rank";
pub const PRODUCT_COLUMN: &str = "chocolate_bar";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    /// 1-based, contiguous
    pub rank: usize,
    pub product: ProductId,
    /// Display attribute values, in [`RecommendationTable::attribute_columns`] order
    pub attributes: Vec<Cell>,
}

/// Final, ordered recommendation list
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RecommendationTable {
    attribute_columns: Vec<String>,
    rows: Vec<Recommendation>,
}

impl RecommendationTable {
    pub fn attribute_columns(&self) -> &[String] {
        &self.attribute_columns
    }

    pub fn rows(&self) -> &[Recommendation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn product_ids(&self) -> Vec<ProductId> {
        self.rows.iter().map(|r| r.product).collect()
    }

    /// `rank, chocolate_bar, <attributes...>`
    pub fn columns(&self) -> Vec<String> {
        [RANK_COLUMN, PRODUCT_COLUMN]
            .into_iter()
            .map(String::from)
            .chain(self.attribute_columns.iter().cloned())
            .collect()
    }

    pub fn to_table(&self) -> Result<Table> {
        let rows = self
            .rows
            .iter()
            .map(|rec| {
                let mut row = Vec::with_capacity(rec.attributes.len() + 2);
                row.push(Cell::Int(rec.rank as i64));
                row.push(Cell::from(rec.product));
                row.extend(rec.attributes.iter().cloned());
                row
            })
            .collect();
        Table::with_rows(self.columns(), rows)
    }
}

/// Turn a neighbor row into the ranked, attribute-enriched result
///
/// The query's own id is dropped and at most `top_n` neighbors are kept.
/// Neighbors missing from `display` are dropped as well; ranks of the
/// remaining rows are renumbered from 1 so they stay contiguous. When the
/// display table repeats an id, its first row is used.
pub fn format(
    neighbors: &NeighborRow,
    display: &Table,
    top_n: usize,
    id_column: &str,
) -> Result<RecommendationTable> {
    let index = display.index_by_id(id_column)?;
    let id_idx = display.column_index(id_column)?;
    let attribute_idx: Vec<usize> = (0..display.columns().len()).filter(|&i| i != id_idx).collect();

    let mut rows = Vec::with_capacity(top_n);
    for product in neighbors
        .neighbors
        .iter()
        .copied()
        .filter(|id| *id != neighbors.query)
        .take(top_n)
    {
        let Some(&row_no) = index.get(&product) else {
            debug!("Neighbor {} has no display attributes, dropping it", product);
            continue;
        };
        let source = &display.rows()[row_no];
        rows.push(Recommendation {
            rank: rows.len() + 1,
            product,
            attributes: attribute_idx.iter().map(|&i| source[i].clone()).collect(),
        });
    }

    Ok(RecommendationTable {
        attribute_columns: attribute_idx
            .iter()
            .map(|&i| display.columns()[i].clone())
            .collect(),
        rows,
    })
}
