use criterion::{black_box, criterion_group, criterion_main, Criterion};

use adaptive_intersection::flow_analyzer::{
    compute_efficiency, compute_throughput, predict_congestion, PerformanceHistory,
};
use adaptive_intersection::global_variables::HISTORY_CAPACITY;
use adaptive_intersection::shared_data::PerformanceSample;
use adaptive_intersection::simulation_engine::weather::WeatherCondition;

fn bench_metrics(c: &mut Criterion) {
    c.bench_function("compute_efficiency", |b| {
        b.iter(|| {
            black_box(compute_efficiency(
                black_box(12.4),
                black_box(17),
                WeatherCondition::Fog,
                false,
            ))
        });
    });

    c.bench_function("compute_throughput", |b| {
        b.iter(|| black_box(compute_throughput(black_box(412), black_box(305_000))));
    });

    c.bench_function("predict_congestion", |b| {
        b.iter(|| black_box(predict_congestion(black_box([4, 11, 9, 2]))));
    });

    // history at capacity, so every record evicts
    let mut history = PerformanceHistory::new(HISTORY_CAPACITY);
    let mut t = 0u64;
    c.bench_function("history_record_full", |b| {
        b.iter(|| {
            t += 5_000;
            history.record(PerformanceSample {
                timestamp_ms: t,
                efficiency: 88.0,
                throughput: 14,
                total_queue_length: 9,
            });
            black_box(history.average_efficiency())
        });
    });
}

criterion_group!(benches, bench_metrics);
criterion_main!(benches);
