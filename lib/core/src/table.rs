use crate::error::{Error, Result};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a catalog entry
///
/// Catalog files carry integer references. The synthetic query row uses a
/// reserved value (see [`ProductId::SENTINEL`]) that real entries never take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl ProductId {
    /// Reserved identifier of the user's query row
    pub const SENTINEL: ProductId = ProductId(999_999);
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        ProductId(id)
    }
}

/// A single table value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    /// Parse a raw field the way a delimited file is read: integer, then float, then text
    ///
    /// `NaN` and infinities stay text so they surface as non-numeric features.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Cell::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return Cell::Float(f);
            }
        }
        Cell::Text(raw.to_string())
    }

    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) => Some(*f),
            Cell::Text(_) => None,
        }
    }

    /// Interpret the cell as a product identifier
    ///
    /// Text ids are accepted as long as they parse as integers, so a query
    /// row built with `"999999"` matches `999999` read from a file.
    pub fn as_id(&self) -> Option<ProductId> {
        match self {
            Cell::Int(i) => Some(ProductId(*i)),
            Cell::Float(f) if f.fract() == 0.0 => Some(ProductId(*f as i64)),
            Cell::Float(_) => None,
            Cell::Text(s) => s.trim().parse::<i64>().ok().map(ProductId),
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Cell::Text(_))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(i) => write!(f, "{}", i),
            Cell::Float(x) => write!(f, "{}", x),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Int(v)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Float(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}

impl From<ProductId> for Cell {
    fn from(id: ProductId) -> Self {
        Cell::Int(id.0)
    }
}

/// An in-memory, row-major table with named columns
///
/// Every row has exactly one cell per column. Tables are treated as
/// values: operations that reshape them return a new table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn with_rows<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: Vec<Vec<Cell>>,
    ) -> Result<Self> {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[inline]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| Error::missing_column(name))
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::DimensionMismatch {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn get(&self, row: usize, column: &str) -> Result<&Cell> {
        let col = self.column_index(column)?;
        self.rows
            .get(row)
            .map(|r| &r[col])
            .ok_or(Error::RowOutOfRange {
                row,
                len: self.rows.len(),
            })
    }

    /// Keep exactly `columns`, in that order
    pub fn project<S: AsRef<str>>(&self, columns: &[S]) -> Result<Table> {
        let indices = columns
            .iter()
            .map(|c| self.column_index(c.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();

        Ok(Table {
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            rows,
        })
    }

    pub fn rename_column(&mut self, from: &str, to: &str) -> Result<()> {
        let idx = self.column_index(from)?;
        self.columns[idx] = to.to_string();
        Ok(())
    }

    /// Rewrite every cell of one column in place
    pub fn map_column<F>(&mut self, column: &str, mut f: F) -> Result<()>
    where
        F: FnMut(usize, &Cell) -> Result<Cell>,
    {
        let idx = self.column_index(column)?;
        for (row_no, row) in self.rows.iter_mut().enumerate() {
            row[idx] = f(row_no, &row[idx])?;
        }
        Ok(())
    }

    pub fn numeric_column(&self, column: &str) -> Result<Vec<f64>> {
        let idx = self.column_index(column)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row_no, row)| numeric(&row[idx], column, row_no))
            .collect()
    }

    /// Extract the named columns as a dense row-major matrix
    pub fn feature_matrix<S: AsRef<str>>(&self, columns: &[S]) -> Result<Vec<Vec<f64>>> {
        let indices = columns
            .iter()
            .map(|c| self.column_index(c.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        self.rows
            .iter()
            .enumerate()
            .map(|(row_no, row)| {
                indices
                    .iter()
                    .zip(columns)
                    .map(|(&i, name)| numeric(&row[i], name.as_ref(), row_no))
                    .collect()
            })
            .collect()
    }

    /// Identifier of every row, in row order
    pub fn ids(&self, id_column: &str) -> Result<Vec<ProductId>> {
        let idx = self.column_index(id_column)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row_no, row)| {
                row[idx].as_id().ok_or_else(|| Error::NonNumeric {
                    column: id_column.to_string(),
                    row: row_no,
                    value: row[idx].to_string(),
                })
            })
            .collect()
    }

    /// Map each identifier to the first row that carries it
    pub fn index_by_id(&self, id_column: &str) -> Result<AHashMap<ProductId, usize>> {
        let idx = self.column_index(id_column)?;
        let mut index = AHashMap::with_capacity(self.rows.len());
        for (row_no, row) in self.rows.iter().enumerate() {
            if let Some(id) = row[idx].as_id() {
                index.entry(id).or_insert(row_no);
            }
        }
        Ok(index)
    }

    /// Stack `other` below `self`; both must have identical columns
    pub fn concat(&self, other: &Table) -> Result<Table> {
        if self.columns != other.columns {
            let column = other
                .columns
                .iter()
                .chain(self.columns.iter())
                .find(|c| !self.has_column(c) || !other.has_column(c))
                .cloned()
                .unwrap_or_else(|| other.columns.join(","));
            return Err(Error::missing_column(column));
        }
        let mut rows = Vec::with_capacity(self.rows.len() + other.rows.len());
        rows.extend(self.rows.iter().cloned());
        rows.extend(other.rows.iter().cloned());
        Ok(Table {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Copy out the rows at `indices`, in that order
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
        }
    }
}

fn numeric(cell: &Cell, column: &str, row: usize) -> Result<f64> {
    cell.as_f64().ok_or_else(|| Error::NonNumeric {
        column: column.to_string(),
        row,
        value: cell.to_string(),
    })
}
