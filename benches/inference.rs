//! Inference benchmark: feature map → preprocess → tree ensemble → decision record.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use flow_sentinel::config::{ArtifactCandidates, PreprocessConfig};
use flow_sentinel::decision::ThreatDetector;
use flow_sentinel::features::{FeatureMap, FEATURE_COUNT, FEATURE_NAMES};
use flow_sentinel::model::ArtifactLoader;
use ndarray::Array2;

/// Complete binary trees of `depth`, splitting on features round-robin.
fn forest_json(n_trees: usize, depth: u32) -> String {
    let internal = (1usize << depth) - 1;
    let mut trees = Vec::with_capacity(n_trees);
    for t in 0..n_trees {
        let mut nodes = Vec::new();
        for i in 0..internal {
            nodes.push(format!(
                r#"{{"kind":"split","feature":{},"threshold":{}.0,"left":{},"right":{}}}"#,
                (i + t) % FEATURE_COUNT,
                (i * 37) % 1000,
                2 * i + 1,
                2 * i + 2
            ));
        }
        for i in 0..=internal {
            nodes.push(format!(r#"{{"kind":"leaf","value":[{}.0,{}.0]}}"#, i % 3 + 1, (i + t) % 4));
        }
        trees.push(format!(r#"{{"nodes":[{}]}}"#, nodes.join(",")));
    }
    format!(
        r#"{{"n_features":{FEATURE_COUNT},"n_classes":2,"trees":[{}]}}"#,
        trees.join(",")
    )
}

fn detector(n_trees: usize, depth: u32) -> (tempfile::TempDir, ThreatDetector) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("model.json"), forest_json(n_trees, depth)).unwrap();
    let bundle = ArtifactLoader::new(ArtifactCandidates::default())
        .load(dir.path())
        .unwrap();
    (dir, ThreatDetector::new(bundle, PreprocessConfig::default()))
}

fn bench_predict_threat(c: &mut Criterion) {
    let (_dir, detector) = detector(100, 8);
    let features: FeatureMap = FEATURE_NAMES
        .iter()
        .enumerate()
        .map(|(i, n)| (n.to_string(), (i * 113) as f64))
        .collect();

    c.bench_function("predict_threat_100_trees_depth_8", |b| {
        b.iter(|| detector.predict_threat(black_box(&features)))
    });
}

fn bench_predict_labels_by_rows(c: &mut Criterion) {
    let (_dir, detector) = detector(100, 8);

    let mut g = c.benchmark_group("predict_labels_by_rows");
    for rows in [1, 16, 256] {
        let m = Array2::from_shape_fn((rows, FEATURE_COUNT), |(i, j)| ((i * 31 + j * 7) % 1000) as f32);
        g.bench_function(format!("rows_{}", rows).as_str(), |b| {
            b.iter(|| detector.predict_labels(black_box(m.view())).unwrap())
        });
    }
    g.finish();
}

criterion_group!(benches, bench_predict_threat, bench_predict_labels_by_rows);
criterion_main!(benches);
