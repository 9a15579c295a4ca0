//! Stage orchestration with file side effects
//!
//! Each function runs one stage end to end: read its input from disk, call
//! into the library crates, and persist what the next stage consumes.

use crate::config::{CleanConfig, ModelConfig, PipelineConfig};
use anyhow::Context;
use chocorec_cluster::{train, TrainOutcome};
use chocorec_core::{clean, Table};
use chocorec_recommend::{build_query_row, QueryValue, RecommendationTable, Recommender};
use chocorec_storage::{read_table, write_metrics, write_table, CatalogSource, CsvCatalog, ModelStore};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Raw catalog → cleaned CSV
pub fn clean_catalog(config: &CleanConfig) -> anyhow::Result<Table> {
    let raw = read_table(&config.source_path)
        .with_context(|| format!("Failed to read raw catalog {:?}", config.source_path))?;
    let cleaned = clean(raw, &config.spec).context("Failed to clean catalog")?;

    write_table(&config.output_path, &cleaned)
        .with_context(|| format!("Failed to write cleaned catalog {:?}", config.output_path))?;
    info!("Clean data is saved to {:?}", config.output_path);
    Ok(cleaned)
}

/// Cleaned CSV → model artifact and metrics file
///
/// The metrics file is only written when the partition could be scored.
pub fn train_model(clean_path: &Path, config: &ModelConfig) -> anyhow::Result<TrainOutcome> {
    let catalog = read_table(clean_path)
        .with_context(|| format!("Failed to read cleaned catalog {:?}", clean_path))?;
    info!("Training catalog has {} rows", catalog.len());

    let outcome = train(&catalog, &config.schema, &config.kmeans).context("Failed to train cluster model")?;
    ModelStore::new(&config.artifact_path)
        .save(&outcome.model)
        .context("Failed to save cluster model")?;

    if let Some(evaluation) = &outcome.evaluation {
        write_metrics(&config.metrics_path, evaluation).context("Failed to write metrics")?;
    }
    Ok(outcome)
}

/// Query values → recommendation CSV
pub fn recommend_query(config: &PipelineConfig, values: &[QueryValue]) -> anyhow::Result<RecommendationTable> {
    let schema = &config.model.schema;
    let params = &config.recommend.params;

    let model = ModelStore::new(&config.model.artifact_path)
        .load()
        .context("Failed to load cluster model")?;
    let strategy = config.recommend.scaler.build(&model)?;
    let recommender = Recommender::new(schema.clone(), Arc::new(model), params.clone())?.with_strategy(strategy);

    let query_row = build_query_row(schema, values, params.sentinel, &config.recommend.yes_no)
        .context("Invalid query")?;

    let catalog = CsvCatalog::new(&config.clean.output_path)
        .snapshot()
        .with_context(|| format!("Failed to read cleaned catalog {:?}", config.clean.output_path))?;
    info!("Recommending from a catalog of {} rows", catalog.len());

    let result = recommender.recommend(&catalog, &query_row)?;
    write_table(&config.recommend.output_path, &result.to_table()?)
        .with_context(|| format!("Failed to write recommendations {:?}", config.recommend.output_path))?;
    info!("Recommendations are saved to {:?}", config.recommend.output_path);
    Ok(result)
}
