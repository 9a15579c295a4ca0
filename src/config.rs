//! Pipeline configuration
//!
//! One JSON document with a section per stage. The file is layered over the
//! serialized defaults before it is typed, so a partial file only overrides
//! what it names. Objects merge key by key; arrays and scalars replace.

use anyhow::Context;
use chocorec_cluster::KMeans;
use chocorec_core::{CleanSpec, FeatureSchema, FlagEncoder, ProductId};
use chocorec_recommend::{default_yes_no_map, RecommendParams, ScalerStrategyKind, YesNoMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub clean: CleanConfig,
    pub model: ModelConfig,
    pub recommend: RecommendConfig,
}

impl PipelineConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Configuration file {:?} is not found", path))?;
        let overrides: Value = serde_json::from_str(&raw)
            .with_context(|| format!("Configuration file {:?} is not valid JSON", path))?;
        Self::from_overrides(overrides)
            .with_context(|| format!("Configuration file {:?} is not valid", path))
    }

    /// Defaults with `overrides` merged on top
    pub fn from_overrides(overrides: Value) -> anyhow::Result<Self> {
        let mut merged = serde_json::to_value(Self::default())?;
        merge(&mut merged, overrides);
        Ok(serde_json::from_value(merged)?)
    }

    /// Read `path` when given, otherwise the built-in defaults
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Ok(Self::default()),
        }
    }
}

fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                merge(base.entry(key).or_insert(Value::Null), value);
            }
        }
        (base, overlay) => *base = overlay,
    }
}

const BINARY_FEATURES: [&str; 7] = [
    "beans",
    "cocoa_butter",
    "vanilla",
    "lecithin",
    "salt",
    "sugar",
    "sweetener_without_sugar",
];

fn strings<'a>(items: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    items.into_iter().map(String::from).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CleanConfig {
    /// Raw catalog export
    pub source_path: PathBuf,
    /// Where the cleaned catalog is written
    pub output_path: PathBuf,
    #[serde(flatten)]
    pub spec: CleanSpec,
}

impl Default for CleanConfig {
    fn default() -> Self {
        let kept = ["index", "company", "specific_bean_origin_or_bar_name", "cocoa_percent", "rating"]
            .into_iter()
            .chain(BINARY_FEATURES)
            .chain(["first_taste", "second_taste"]);

        Self {
            source_path: PathBuf::from("data/chocolate_bars.csv"),
            output_path: PathBuf::from("data/clean.csv"),
            spec: CleanSpec {
                id_column: "index".to_string(),
                source_id_column: Some("ref".to_string()),
                binary_features: strings(BINARY_FEATURES),
                kept_columns: strings(kept),
                encoder: FlagEncoder::default(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    pub schema: FeatureSchema,
    #[serde(flatten)]
    pub kmeans: KMeans,
    pub artifact_path: PathBuf,
    pub metrics_path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            schema: FeatureSchema::chocolate_bars(),
            kmeans: KMeans::new(10, 42),
            artifact_path: PathBuf::from("models/kmeans.bin"),
            metrics_path: PathBuf::from("models/metrics.csv"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecommendConfig {
    #[serde(flatten)]
    pub params: RecommendParams,
    /// Form token to flag value
    pub yes_no: YesNoMap,
    pub scaler: ScalerStrategyKind,
    pub output_path: PathBuf,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            params: RecommendParams::new(
                [
                    "company",
                    "specific_bean_origin_or_bar_name",
                    "cocoa_percent",
                    "rating",
                    "first_taste",
                    "second_taste",
                ],
                5,
            )
            .with_sentinel(ProductId::SENTINEL),
            yes_no: default_yes_no_map(),
            scaler: ScalerStrategyKind::default(),
            output_path: PathBuf::from("data/recommendations.csv"),
        }
    }
}
