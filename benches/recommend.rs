// Training and recommendation benchmarks over a synthetic catalog
use chocorec::{
    default_yes_no_map, train, Cell, ChocolateQuery, FeatureSchema, KMeans, ProductId,
    RecommendParams, Recommender, Table,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use std::sync::Arc;

fn generate_catalog(size: usize, rng: &mut StdRng) -> Table {
    let schema = FeatureSchema::chocolate_bars();
    let mut columns = schema.model_columns();
    columns.push("company");

    let mut table = Table::new(columns);
    for i in 0..size {
        let mut row = vec![
            Cell::Int(i as i64),
            Cell::Float(rng.random_range(50.0..100.0)),
            Cell::Float(rng.random_range(1.0..4.0)),
        ];
        row.extend((0..7).map(|_| Cell::Int(rng.random_range(0..2))));
        row.push(Cell::from(format!("company {}", i % 50)));
        table.push_row(row).unwrap();
    }
    table
}

fn query() -> Table {
    ChocolateQuery {
        cocoa_percent: 72.0,
        rating: 3.5,
        beans: "Yes".to_string(),
        cocoa_butter: "Yes".to_string(),
        vanilla: "No".to_string(),
        lecithin: "No".to_string(),
        salt: "No".to_string(),
        sugar: "Yes".to_string(),
        sweetener_without_sugar: "No".to_string(),
    }
    .to_row(&FeatureSchema::chocolate_bars(), ProductId::SENTINEL, &default_yes_no_map())
    .unwrap()
}

fn benchmark_train(c: &mut Criterion) {
    let mut group = c.benchmark_group("train");
    group.sample_size(10);
    let schema = FeatureSchema::chocolate_bars();
    let mut rng = StdRng::seed_from_u64(7);

    for size in [500, 2000].iter() {
        let catalog = generate_catalog(*size, &mut rng);
        group.bench_with_input(BenchmarkId::new("kmeans_k10", size), &catalog, |b, catalog| {
            b.iter(|| train(black_box(catalog), &schema, &KMeans::new(10, 42)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_recommend(c: &mut Criterion) {
    let mut group = c.benchmark_group("recommend");
    let schema = FeatureSchema::chocolate_bars();
    let mut rng = StdRng::seed_from_u64(11);
    let query = query();

    for size in [1000, 5000].iter() {
        let catalog = generate_catalog(*size, &mut rng);
        let model = train(&catalog, &schema, &KMeans::new(10, 42).with_n_init(1))
            .unwrap()
            .model;
        let recommender = Recommender::new(
            schema.clone(),
            Arc::new(model),
            RecommendParams::new(["company"], 10),
        )
        .unwrap();

        group.bench_with_input(BenchmarkId::new("top10", size), &catalog, |b, catalog| {
            b.iter(|| recommender.recommend(black_box(catalog), black_box(&query)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_train, benchmark_recommend);
criterion_main!(benches);
