use annot_rs::api::{AnnotationEngine, AnnotationEngineConfig};
use annot_rs::artifacts::{Artifact, BarCountArtifact};
use annot_rs::core::{BarCollection, PriceBar, PriceBarIndex, ScenePoint};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn generated_bars(count: usize) -> Vec<PriceBar> {
    (0..count)
        .map(|i| {
            let x = i as f64;
            let base = 100.0 + x * 0.05;
            let open = base;
            let close = if i % 2 == 0 { base + 1.0 } else { base - 1.0 };
            let low = open.min(close) - 0.75;
            let high = open.max(close) + 0.75;
            PriceBar::new(x, open, high, low, close).expect("valid generated bar")
        })
        .collect()
}

fn bench_closest_ohlc_10k(c: &mut Criterion) {
    let mut collection = BarCollection::new();
    collection.set_bars(generated_bars(10_000));
    let query = ScenePoint::new(7_321.4, -420.0);

    c.bench_function("closest_ohlc_10k", |b| {
        b.iter(|| collection.closest_ohlc_scene_point(black_box(query)))
    });
}

fn bench_bar_count_recalculate_10k(c: &mut Criterion) {
    let mut collection = BarCollection::new();
    collection.set_bars(generated_bars(10_000));

    let mut artifact = BarCountArtifact::new("bench", ScenePoint::new(100.0, -100.0));
    artifact.set_end_point(ScenePoint::new(9_900.0, -100.0));

    c.bench_function("bar_count_recalculate_10k", |b| {
        b.iter(|| black_box(artifact.recalculate(&collection)))
    });
}

fn bench_artifacts_json_200(c: &mut Criterion) {
    let mut engine = AnnotationEngine::new(AnnotationEngineConfig::default()).expect("engine init");
    engine.set_bars(generated_bars(2_000));

    for i in 0..200 {
        let start = f64::from(i) * 5.0;
        let mut counter = BarCountArtifact::new("", ScenePoint::new(start, -100.0));
        counter.set_end_point(ScenePoint::new(start + 40.0, -100.0));
        engine
            .add_artifact(Artifact::BarCount(counter))
            .expect("artifact added");
    }

    c.bench_function("artifacts_json_200", |b| {
        b.iter(|| engine.artifacts_json().expect("snapshot json should succeed"))
    });
}

criterion_group!(
    benches,
    bench_closest_ohlc_10k,
    bench_bar_count_recalculate_10k,
    bench_artifacts_json_200
);
criterion_main!(benches);
