use crate::error::{Error, Result};
use crate::table::{Cell, Table};
use serde::{Deserialize, Serialize};

/// Zero-mean, unit-variance scaling over a fixed set of columns
///
/// Uses the population standard deviation (divisor `n`). A column with zero
/// variance gets a scale of 1.0, so it maps to 0 instead of NaN.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scaler {
    columns: Vec<String>,
    mean: Vec<f64>,
    scale: Vec<f64>,
    n_samples: usize,
}

impl Scaler {
    /// Fit per-column mean and standard deviation on `table`
    pub fn fit<S: AsRef<str>>(table: &Table, columns: &[S]) -> Result<Self> {
        if table.is_empty() {
            return Err(Error::EmptyTable);
        }

        let n = table.len() as f64;
        let mut mean = Vec::with_capacity(columns.len());
        let mut scale = Vec::with_capacity(columns.len());

        for column in columns {
            let values = table.numeric_column(column.as_ref())?;
            let m = values.iter().sum::<f64>() / n;
            let var = values.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / n;
            let std = var.sqrt();
            mean.push(m);
            scale.push(if std > f64::EPSILON { std } else { 1.0 });
        }

        Ok(Self {
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            mean,
            scale,
            n_samples: table.len(),
        })
    }

    /// Fit on `table` and return it standardized
    pub fn fit_transform<S: AsRef<str>>(table: &Table, columns: &[S]) -> Result<Table> {
        Self::fit(table, columns)?.transform(table)
    }

    /// Apply the fitted transformation; other columns pass through untouched
    pub fn transform(&self, table: &Table) -> Result<Table> {
        let mut out = table.clone();
        for (i, column) in self.columns.iter().enumerate() {
            let (m, s) = (self.mean[i], self.scale[i]);
            out.map_column(column, |row, cell| {
                let x = cell.as_f64().ok_or_else(|| Error::NonNumeric {
                    column: column.clone(),
                    row,
                    value: cell.to_string(),
                })?;
                Ok(Cell::Float((x - m) / s))
            })?;
        }
        Ok(out)
    }

    /// Standardize a single feature vector laid out in `columns()` order
    pub fn transform_vector(&self, values: &[f64]) -> Result<Vec<f64>> {
        if values.len() != self.columns.len() {
            return Err(Error::DimensionMismatch {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }
        Ok(values
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }

    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[inline]
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    #[inline]
    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    /// Number of rows the parameters were fitted on
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }
}
