//! Feature schema definitions
//!
//! A single ordered descriptor of the modeling features. The query injector,
//! the standardizer and the cluster model all read column order from here,
//! so a query vector always lines up with the training matrix.

use crate::error::{Error, Result};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered feature schema
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureSchema {
    /// Schema version for future compatibility
    #[serde(default = "default_version")]
    pub version: u32,

    /// Name of the identifier column
    pub id_column: String,

    /// Modeling features, in matrix column order
    pub features: Vec<FeatureDef>,
}

fn default_version() -> u32 {
    1
}

impl FeatureSchema {
    pub fn new(id_column: impl Into<String>, features: Vec<FeatureDef>) -> Self {
        Self {
            version: 1,
            id_column: id_column.into(),
            features,
        }
    }

    /// The chocolate bar feature set: two continuous attributes followed by
    /// seven ingredient-presence flags
    pub fn chocolate_bars() -> Self {
        Self::new(
            "index",
            vec![
                FeatureDef::continuous("cocoa_percent"),
                FeatureDef::continuous("rating"),
                FeatureDef::binary("beans"),
                FeatureDef::binary("cocoa_butter"),
                FeatureDef::binary("vanilla"),
                FeatureDef::binary("lecithin"),
                FeatureDef::binary("salt"),
                FeatureDef::binary("sugar"),
                FeatureDef::binary("sweetener_without_sugar"),
            ],
        )
    }

    /// Validate the schema
    /// - At least one feature
    /// - No duplicate feature names
    /// - The identifier is never a feature
    pub fn validate(&self) -> Result<()> {
        if self.features.is_empty() {
            return Err(Error::InvalidConfig("feature schema is empty".to_string()));
        }

        let mut seen = HashSet::with_capacity(self.features.len());
        for feature in &self.features {
            if feature.name == self.id_column {
                return Err(Error::InvalidConfig(format!(
                    "identifier column '{}' cannot be a feature",
                    self.id_column
                )));
            }
            if !seen.insert(feature.name.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "feature '{}' is listed twice",
                    feature.name
                )));
            }
        }

        Ok(())
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.features.len()
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn binary_features(&self) -> Vec<&str> {
        self.features
            .iter()
            .filter(|f| f.kind == FeatureKind::Binary)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Identifier column followed by every feature
    pub fn model_columns(&self) -> Vec<&str> {
        std::iter::once(self.id_column.as_str())
            .chain(self.features.iter().map(|f| f.name.as_str()))
            .collect()
    }

    /// Fail on the first schema column the table does not carry
    pub fn check_table(&self, table: &Table) -> Result<()> {
        for column in self.model_columns() {
            if !table.has_column(column) {
                return Err(Error::missing_column(column));
            }
        }
        Ok(())
    }

    /// Check that a feature list matches this schema exactly, order included
    pub fn check_features<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        let ours = self.feature_names();
        if ours.len() != names.len() {
            return Err(Error::DimensionMismatch {
                expected: ours.len(),
                actual: names.len(),
            });
        }
        for (expected, actual) in ours.iter().zip(names) {
            if *expected != actual.as_ref() {
                return Err(Error::missing_column(*expected));
            }
        }
        Ok(())
    }
}

/// A single modeling feature
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureDef {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: FeatureKind,
}

impl FeatureDef {
    pub fn continuous(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FeatureKind::Continuous,
        }
    }

    pub fn binary(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FeatureKind::Binary,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    /// Real-valued attribute (cocoa percentage, rating)
    Continuous,
    /// 0/1 presence flag
    Binary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    #[test]
    fn test_chocolate_schema() {
        let schema = FeatureSchema::chocolate_bars();
        schema.validate().unwrap();
        assert_eq!(schema.dim(), 9);
        assert_eq!(schema.binary_features().len(), 7);
        assert_eq!(schema.model_columns()[0], "index");
        assert_eq!(schema.model_columns()[1], "cocoa_percent");
    }

    #[test]
    fn test_id_cannot_be_feature() {
        let schema = FeatureSchema::new(
            "index",
            vec![FeatureDef::continuous("index"), FeatureDef::continuous("rating")],
        );
        assert!(matches!(schema.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_duplicate_feature_rejected() {
        let schema = FeatureSchema::new(
            "index",
            vec![FeatureDef::binary("salt"), FeatureDef::binary("salt")],
        );
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_check_table() {
        let schema = FeatureSchema::new("index", vec![FeatureDef::continuous("rating")]);
        let ok = Table::with_rows(["index", "rating"], vec![vec![Cell::Int(1), Cell::Float(3.0)]])
            .unwrap();
        schema.check_table(&ok).unwrap();

        let missing = Table::new(["index"]);
        assert!(matches!(
            schema.check_table(&missing),
            Err(Error::SchemaMismatch { column }) if column == "rating"
        ));
    }

    #[test]
    fn test_check_features_order_matters() {
        let schema = FeatureSchema::new(
            "index",
            vec![FeatureDef::continuous("a"), FeatureDef::continuous("b")],
        );
        schema.check_features(&["a", "b"]).unwrap();
        assert!(schema.check_features(&["b", "a"]).is_err());
        assert!(schema.check_features(&["a"]).is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let schema = FeatureSchema::chocolate_bars();
        let json = serde_json::to_string(&schema).unwrap();
        assert!(json.contains("\"type\":\"binary\""));
        let parsed: FeatureSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(schema, parsed);
    }
}
