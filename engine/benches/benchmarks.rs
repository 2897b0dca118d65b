//! Performance benchmarks for formsync-engine

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use formsync_engine::{
    can_import, can_sync, FixedClock, FormDefinition, FormFile, FormStore, Hooks,
    MemoryFormStore, PermissionGate, SyncConfig, SyncEngine, SyncSettings,
};
use serde_json::json;
use tempfile::TempDir;

fn sample_form(i: usize) -> FormDefinition {
    FormDefinition::new(format!("Form {}", i))
        .with_settings(SyncSettings::enabled(format!("local_gf_{:05}", i)).with_modified(1000))
        .with_field(
            "fields",
            json!([
                {"id": 1, "type": "name", "label": "Name", "isRequired": true},
                {"id": 2, "type": "email", "label": "Email"},
                {"id": 3, "type": "textarea", "label": "Message"}
            ]),
        )
}

/// A save point with `size` files; every other form also exists live, half of
/// those with a newer stamp.
fn populated(size: usize) -> (TempDir, SyncEngine<MemoryFormStore>) {
    let dir = tempfile::tempdir().unwrap();
    let engine = SyncEngine::new(
        MemoryFormStore::new(),
        SyncConfig::default().with_save_point(dir.path()),
        PermissionGate::default(),
        Hooks::new(),
    )
    .with_clock(FixedClock::new(1000));

    for i in 0..size {
        let form = sample_form(i);
        let json = FormFile::new(form.clone()).to_json().unwrap();
        engine
            .files()
            .write(&format!("local_gf_{:05}", i), &json)
            .unwrap();

        if i % 2 == 0 {
            let mut live = form;
            if i % 4 == 0 {
                live = live.with_settings(
                    SyncSettings::enabled(format!("local_gf_{:05}", i)).with_modified(2000),
                );
            }
            engine.store().create_form(live).unwrap();
        }
    }
    (dir, engine)
}

fn bench_listing(c: &mut Criterion) {
    let mut group = c.benchmark_group("listing");
    group.sample_size(20);

    for size in [10, 100, 500] {
        let (_dir, engine) = populated(size);

        group.bench_with_input(BenchmarkId::new("list_all", size), &size, |b, _| {
            b.iter(|| black_box(engine.files().list_all().unwrap()))
        });

        group.bench_with_input(BenchmarkId::new("records", size), &size, |b, _| {
            b.iter(|| black_box(engine.records().unwrap()))
        });
    }

    group.finish();
}

fn bench_predicates(c: &mut Criterion) {
    let (_dir, engine) = populated(500);
    let live = engine.live_forms_by_key().unwrap();
    let files = engine.files().list_all().unwrap();

    c.bench_function("classify_500", |b| {
        b.iter(|| {
            files
                .iter()
                .filter(|f| can_import(black_box(&live), f) || can_sync(black_box(&live), f))
                .count()
        })
    });
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let file = FormFile::new(sample_form(1)).with_version("1.0.0");
    let json = file.to_json().unwrap();
    let source = std::path::Path::new("bench.json");

    group.bench_function("encode", |b| b.iter(|| black_box(&file).to_json().unwrap()));
    group.bench_function("decode", |b| {
        b.iter(|| FormFile::from_json(black_box(&json), source).unwrap())
    });

    group.finish();
}

fn bench_export(c: &mut Criterion) {
    let (_dir, engine) = populated(0);
    let id = engine.store().create_form(sample_form(1)).unwrap();

    c.bench_function("export", |b| {
        b.iter(|| engine.on_form_saved(black_box(id)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_listing,
    bench_predicates,
    bench_codec,
    bench_export
);
criterion_main!(benches);
