//! Query injection
//!
//! Builds the single synthetic row that stands for the user's product
//! description. Column order comes from the [`FeatureSchema`], so the row
//! always lines up with the catalog's modeling columns.

use chocorec_core::{Cell, Error, FeatureSchema, ProductId, Result, Table};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A user-supplied value for one feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Number(f64),
    /// A human-facing token such as "Yes" or "No"
    Token(String),
}

impl From<f64> for QueryValue {
    fn from(v: f64) -> Self {
        QueryValue::Number(v)
    }
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        QueryValue::Token(v.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        QueryValue::Token(v)
    }
}

/// Token to flag value mapping
pub type YesNoMap = HashMap<String, i64>;

/// `Yes → 1`, `No → 0`
pub fn default_yes_no_map() -> YesNoMap {
    HashMap::from([("Yes".to_string(), 1), ("No".to_string(), 0)])
}

/// Assemble the query row: sentinel id first, then one value per feature
///
/// Tokens found in `yes_no` become integers. Unmapped tokens are kept as
/// text; they are not validated here and fail later when the row is scaled.
pub fn build_query_row(
    schema: &FeatureSchema,
    values: &[QueryValue],
    sentinel: ProductId,
    yes_no: &YesNoMap,
) -> Result<Table> {
    if values.len() != schema.dim() {
        return Err(Error::DimensionMismatch {
            expected: schema.dim(),
            actual: values.len(),
        });
    }

    let mut row = Vec::with_capacity(values.len() + 1);
    row.push(Cell::from(sentinel));
    row.extend(values.iter().map(|value| match value {
        QueryValue::Number(x) => Cell::Float(*x),
        QueryValue::Token(token) => yes_no
            .get(token)
            .map(|&flag| Cell::Int(flag))
            .unwrap_or_else(|| Cell::Text(token.clone())),
    }));

    Table::with_rows(schema.model_columns(), vec![row])
}

/// The nine inputs of the chocolate bar form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChocolateQuery {
    pub cocoa_percent: f64,
    pub rating: f64,
    pub beans: String,
    pub cocoa_butter: String,
    pub vanilla: String,
    pub lecithin: String,
    pub salt: String,
    pub sugar: String,
    pub sweetener_without_sugar: String,
}

impl ChocolateQuery {
    /// Values in [`FeatureSchema::chocolate_bars`] order
    pub fn values(&self) -> Vec<QueryValue> {
        vec![
            self.cocoa_percent.into(),
            self.rating.into(),
            self.beans.as_str().into(),
            self.cocoa_butter.as_str().into(),
            self.vanilla.as_str().into(),
            self.lecithin.as_str().into(),
            self.salt.as_str().into(),
            self.sugar.as_str().into(),
            self.sweetener_without_sugar.as_str().into(),
        ]
    }

    pub fn to_row(&self, schema: &FeatureSchema, sentinel: ProductId, yes_no: &YesNoMap) -> Result<Table> {
        build_query_row(schema, &self.values(), sentinel, yes_no)
    }
}
