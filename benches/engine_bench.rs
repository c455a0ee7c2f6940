//! Evaluation throughput: one scenario end to end, and the combined-plan allocator.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use engagement::data::asset::{AssetInput, AssetRecord};
use engagement::data::catalog::RawTable;
use engagement::data::source::InMemoryCatalogProvider;
use engagement::engine::probability::{combined_plan, PlanCandidate};
use engagement::engine::weapons::parse_loadout;
use engagement::{Engine, EngineConfig};
use serde_json::{json, Value};

fn catalog() -> InMemoryCatalogProvider {
    let rows = json!([
        {"weapon": "AIM-120C AMRAAM", "effectiveness_percentage": 40, "range_nm": 57},
        {"weapon": "AIM-9X Sidewinder", "effectiveness_percentage": 35, "range_nm": 18},
        {"weapon": "AIM-7M Sparrow", "effectiveness_percentage": 20, "range_nm": 38},
        {"weapon": "M61 Vulcan", "effectiveness_percentage": 5},
    ]);
    let records: Vec<_> = rows
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|row| row.as_object().cloned())
        .collect();
    InMemoryCatalogProvider::new()
        .with_table("red_air_deliverables_air_to_air", RawTable::from_records(&records))
}

fn fleet(size: usize) -> Vec<AssetRecord> {
    let assets: Vec<Value> = (0..size)
        .map(|index| {
            json!({
                "callsign": format!("HARPY {index:02}"),
                "trackcategory": "air",
                "weapon": "2XAIM-9, 4XAIM-120, 2XAIM-7, 1XM61"
            })
        })
        .collect();
    serde_json::from_value::<AssetInput>(Value::Array(assets))
        .map(AssetInput::into_records)
        .unwrap_or_default()
}

fn bench_evaluate(c: &mut Criterion) {
    let config = EngineConfig::default();
    let provider = catalog();
    let target = json!("44875 (CallSign: None, Track Cat: Air, Track ID: Hostile)");

    let mut group = c.benchmark_group("evaluate");
    for size in [1usize, 16, 128] {
        let assets = fleet(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("fleet_{size}"), |b| {
            b.iter(|| {
                let engine = Engine::new(&config, &provider);
                black_box(engine.evaluate(black_box(&assets), black_box(&target)))
            })
        });
    }
    group.finish();
}

fn bench_plans(c: &mut Criterion) {
    let candidates: Vec<PlanCandidate> = (0..8)
        .map(|key| PlanCandidate {
            key,
            per_shot: 0.05 + key as f64 * 0.03,
            quantity: 6,
        })
        .collect();

    c.bench_function("combined_plan_8_types", |b| {
        b.iter(|| black_box(combined_plan(black_box(&candidates), 0.90)))
    });
    c.bench_function("parse_loadout", |b| {
        b.iter(|| black_box(parse_loadout(black_box("2XAIM-9, 4XAIM-120, 4XGBU-53 SD; 2XAGM-88"), 999)))
    });
}

criterion_group!(benches, bench_evaluate, bench_plans);
criterion_main!(benches);
