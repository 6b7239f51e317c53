//! Counting Benchmarks
//!
//! Measures a full assessment session over synthetic landmark frames.
//!
//! # Running Benchmarks
//! ```bash
//! cargo bench --package repcount-engine --bench counting
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use repcount_engine::{analyze, InMemoryLandmarkSource};
use repcount_models::{AssessmentType, Landmark, LandmarkFrame, LandmarkId, PoseLandmarks};

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;

/// A body oscillating through every signal the four assessments read.
fn synthetic_frame(index: u64) -> LandmarkFrame {
    let phase = (index as f64 * 0.2).sin();
    let y = |base: f64| base + 0.1 * phase;
    let x = 0.5 + 0.2 * (index as f64 * 0.05).sin();

    LandmarkFrame::new(
        index,
        WIDTH,
        HEIGHT,
        PoseLandmarks::new(vec![
            Landmark::new(LandmarkId::LeftShoulder, x - 0.05, 0.3, 0.8),
            Landmark::new(LandmarkId::RightShoulder, x + 0.05, 0.3, 0.9),
            Landmark::new(LandmarkId::LeftWrist, x - 0.1, y(0.5), 0.8),
            Landmark::new(LandmarkId::RightWrist, x + 0.1, y(0.5), 0.9),
            Landmark::new(LandmarkId::LeftHip, x - 0.04, y(0.6), 0.8),
            Landmark::new(LandmarkId::RightHip, x + 0.04, y(0.6), 0.9),
        ]),
    )
}

fn bench_sessions(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    for frames in [300u64, 3_000] {
        let source: InMemoryLandmarkSource = (0..frames).map(synthetic_frame).collect();
        group.throughput(Throughput::Elements(frames));

        for assessment in AssessmentType::ALL {
            group.bench_with_input(
                BenchmarkId::new(assessment.as_str(), frames),
                &source,
                |b, source| {
                    b.iter(|| analyze(black_box(source), *assessment));
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_sessions);
criterion_main!(benches);
