//! Catalog cleaning
//!
//! Turns raw ingredient descriptions ("no vanilla", "cocoa butter") into 0/1
//! flags and projects the catalog down to the columns later stages use.

use crate::error::{Error, Result};
use crate::table::{Cell, Table};
use serde::{Deserialize, Serialize};
use tracing::info;

/// How an indicator word is located inside a raw value
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorMatch {
    /// Whole-token match, case-insensitive
    #[default]
    Token,
    /// Raw substring match, case-sensitive
    Substring,
}

/// Maps free-text ingredient descriptions to binary flags
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlagEncoder {
    /// Words marking absence; any hit encodes as 0
    #[serde(default = "default_negative")]
    pub negative: Vec<String>,

    /// Words marking presence. When non-empty, a value must contain one of
    /// these or a negative word.
    #[serde(default)]
    pub positive: Vec<String>,

    #[serde(default)]
    pub mode: IndicatorMatch,
}

fn default_negative() -> Vec<String> {
    vec!["no".to_string(), "not".to_string()]
}

impl Default for FlagEncoder {
    fn default() -> Self {
        Self {
            negative: default_negative(),
            positive: Vec::new(),
            mode: IndicatorMatch::Token,
        }
    }
}

impl FlagEncoder {
    pub fn new<S: Into<String>>(negative: impl IntoIterator<Item = S>) -> Self {
        Self {
            negative: negative.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Legacy behavior: 0 whenever `word` occurs anywhere in the value
    pub fn substring(word: impl Into<String>) -> Self {
        Self {
            negative: vec![word.into()],
            positive: Vec::new(),
            mode: IndicatorMatch::Substring,
        }
    }

    #[must_use]
    pub fn with_positive<S: Into<String>>(mut self, positive: impl IntoIterator<Item = S>) -> Self {
        self.positive = positive.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: IndicatorMatch) -> Self {
        self.mode = mode;
        self
    }

    /// Encode one cell of `column`
    ///
    /// Cells that are already 0 or 1 are returned as integers unchanged.
    pub fn encode(&self, column: &str, cell: &Cell) -> Result<Cell> {
        let invalid = || Error::InvalidFlag {
            column: column.to_string(),
            value: cell.to_string(),
        };

        let text = match cell {
            Cell::Text(text) => text,
            numeric => {
                return match numeric.as_f64() {
                    Some(v) if v == 0.0 => Ok(Cell::Int(0)),
                    Some(v) if v == 1.0 => Ok(Cell::Int(1)),
                    _ => Err(invalid()),
                };
            }
        };

        match self.mode {
            IndicatorMatch::Substring => {
                let absent = self.negative.iter().any(|w| text.contains(w.as_str()));
                Ok(Cell::Int(if absent { 0 } else { 1 }))
            }
            IndicatorMatch::Token => {
                let lowered = text.to_lowercase();
                let tokens: Vec<&str> = tokenize(&lowered).collect();
                let has = |vocab: &[String]| {
                    vocab
                        .iter()
                        .any(|w| tokens.iter().any(|t| t.eq_ignore_ascii_case(w)))
                };

                if has(&self.negative) {
                    Ok(Cell::Int(0))
                } else if self.positive.is_empty() || has(&self.positive) {
                    Ok(Cell::Int(1))
                } else {
                    Err(invalid())
                }
            }
        }
    }
}

/// Split on anything that is not alphanumeric, `_` included, so that
/// `have_not_bean` yields `have`, `not`, `bean`
fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
}

/// Parameters for [`clean`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CleanSpec {
    /// Identifier column name after cleaning
    pub id_column: String,

    /// Identifier column name in the raw source, renamed to `id_column`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id_column: Option<String>,

    /// Columns to encode as 0/1 flags
    pub binary_features: Vec<String>,

    /// Output columns, in order
    pub kept_columns: Vec<String>,

    #[serde(default)]
    pub encoder: FlagEncoder,
}

/// Encode flags and project a raw catalog
///
/// Running `clean` on its own output yields the same table.
pub fn clean(mut table: Table, spec: &CleanSpec) -> Result<Table> {
    normalize_id_column(&mut table, spec)?;

    for column in &spec.binary_features {
        table.map_column(column, |_, cell| spec.encoder.encode(column, cell))?;
    }

    info!("Data has {} observations", table.len());
    info!("Data has {} columns", table.columns().len());

    table.project(&spec.kept_columns)
}

fn normalize_id_column(table: &mut Table, spec: &CleanSpec) -> Result<()> {
    if table.has_column(&spec.id_column) {
        return Ok(());
    }

    if let Some(source) = spec.source_id_column.as_deref() {
        if table.has_column(source) {
            return table.rename_column(source, &spec.id_column);
        }
    }

    // A leading unnamed column is the row index written by many exporters
    if table.has_column("") {
        return table.rename_column("", &spec.id_column);
    }

    Err(Error::missing_column(spec.id_column.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAGS: [&str; 7] = [
        "beans",
        "cocoa_butter",
        "vanilla",
        "lecithin",
        "salt",
        "sugar",
        "sweetener_without_sugar",
    ];

    fn columns() -> Vec<&'static str> {
        let mut cols = vec![
            "index",
            "company",
            "specific_bean_origin_or_bar_name",
            "cocoa_percent",
            "rating",
        ];
        cols.extend(FLAGS);
        cols.extend(["first_taste", "second_taste"]);
        cols
    }

    fn row(head: (i64, &str, &str, f64, f64), flags: [&str; 7], tastes: (&str, &str)) -> Vec<Cell> {
        let mut r = vec![
            Cell::Int(head.0),
            head.1.into(),
            head.2.into(),
            Cell::Float(head.3),
            Cell::Float(head.4),
        ];
        r.extend(flags.iter().map(|f| Cell::from(*f)));
        r.push(tastes.0.into());
        r.push(tastes.1.into());
        r
    }

    fn raw_catalog() -> Table {
        Table::with_rows(
            columns(),
            vec![
                row(
                    (1, "msia company", "evanston", 72.0, 4.5),
                    ["no bean", "no cocoa_butter", "vanilla", "no lecithin", "salt", "sugar", "no sweetener_without_sugar"],
                    ("roasty", "strong"),
                ),
                row(
                    (2, "avc company", "zoom", 55.9, 4.0),
                    ["bean", "no cocoa_butter", "no vanilla", "no lecithin", "no salt", "sugar", "no sweetener_without_sugar"],
                    ("sweet", "milk"),
                ),
                row(
                    (3, "hanyu company", "ridge ave", 78.2, 3.5),
                    ["no bean", "no cocoa_butter", "vanilla", "no lecithin", "salt", "sugar", "sweetener_without_sugar"],
                    ("coconut", "fruity"),
                ),
            ],
        )
        .unwrap()
    }

    fn spec(encoder: FlagEncoder) -> CleanSpec {
        CleanSpec {
            id_column: "index".to_string(),
            source_id_column: None,
            binary_features: FLAGS.iter().map(|s| s.to_string()).collect(),
            kept_columns: columns().iter().map(|s| s.to_string()).collect(),
            encoder,
        }
    }

    fn flags_of(table: &Table, row: usize) -> Vec<i64> {
        FLAGS
            .iter()
            .map(|f| match table.get(row, f).unwrap() {
                Cell::Int(v) => *v,
                other => panic!("unexpected cell {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_clean_encodes_flags() {
        let cleaned = clean(raw_catalog(), &spec(FlagEncoder::default())).unwrap();
        assert_eq!(flags_of(&cleaned, 0), vec![0, 0, 1, 0, 1, 1, 0]);
        assert_eq!(flags_of(&cleaned, 1), vec![1, 0, 0, 0, 0, 1, 0]);
        assert_eq!(flags_of(&cleaned, 2), vec![0, 0, 1, 0, 1, 1, 1]);
        assert_eq!(cleaned.get(0, "first_taste").unwrap(), &Cell::from("roasty"));
    }

    #[test]
    fn test_substring_mode_matches_legacy() {
        let cleaned = clean(raw_catalog(), &spec(FlagEncoder::substring("no"))).unwrap();
        assert_eq!(flags_of(&cleaned, 0), vec![0, 0, 1, 0, 1, 1, 0]);
        assert_eq!(flags_of(&cleaned, 2), vec![0, 0, 1, 0, 1, 1, 1]);
    }

    #[test]
    fn test_token_mode_ignores_embedded_words() {
        let encoder = FlagEncoder::default();
        // "nougat" and "cannot" contain "no" as a substring but not as a token
        assert_eq!(encoder.encode("c", &"nougat".into()).unwrap(), Cell::Int(1));
        assert_eq!(encoder.encode("c", &"NO nougat".into()).unwrap(), Cell::Int(0));
        assert_eq!(
            FlagEncoder::substring("no").encode("c", &"nougat".into()).unwrap(),
            Cell::Int(0)
        );
    }

    #[test]
    fn test_positive_vocabulary_rejects_unknown() {
        let encoder = FlagEncoder::new(["no"]).with_positive(["yes", "have"]);
        assert_eq!(encoder.encode("salt", &"maybe salt".into()).unwrap_err().to_string(),
            "Cannot encode \"maybe salt\" in column salt as a binary flag");
        assert_eq!(encoder.encode("salt", &"have_salt".into()).unwrap(), Cell::Int(1));
        assert_eq!(encoder.encode("salt", &"yes salt".into()).unwrap(), Cell::Int(1));
        assert_eq!(encoder.encode("salt", &"no salt".into()).unwrap(), Cell::Int(0));
    }

    #[test]
    fn test_token_mode_splits_underscores() {
        let encoder = FlagEncoder::default();
        let encoded: Vec<Cell> = ["have_not_bean", "have_bean", "have_not_salt", "have_sweetener_without_sugar"]
            .iter()
            .map(|v| encoder.encode("c", &(*v).into()).unwrap())
            .collect();
        assert_eq!(encoded, vec![Cell::Int(0), Cell::Int(1), Cell::Int(0), Cell::Int(1)]);
    }

    #[test]
    fn test_numeric_flags_pass_through() {
        let encoder = FlagEncoder::default();
        assert_eq!(encoder.encode("salt", &Cell::Int(0)).unwrap(), Cell::Int(0));
        assert_eq!(encoder.encode("salt", &Cell::Float(1.0)).unwrap(), Cell::Int(1));
        assert!(matches!(
            encoder.encode("salt", &Cell::Int(7)),
            Err(Error::InvalidFlag { .. })
        ));
    }

    #[test]
    fn test_clean_is_idempotent() {
        let spec = spec(FlagEncoder::default());
        let once = clean(raw_catalog(), &spec).unwrap();
        let twice = clean(once.clone(), &spec).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_clean_renames_source_id() {
        let mut raw = raw_catalog();
        raw.rename_column("index", "ref").unwrap();
        let mut spec = spec(FlagEncoder::default());
        spec.source_id_column = Some("ref".to_string());

        let cleaned = clean(raw, &spec).unwrap();
        assert_eq!(cleaned.columns()[0], "index");
        assert_eq!(cleaned.get(2, "index").unwrap(), &Cell::Int(3));
    }

    #[test]
    fn test_clean_missing_column_fails() {
        let mut spec = spec(FlagEncoder::default());
        spec.kept_columns.push("third_taste".to_string());
        assert!(matches!(
            clean(raw_catalog(), &spec),
            Err(Error::SchemaMismatch { column }) if column == "third_taste"
        ));
    }
}
