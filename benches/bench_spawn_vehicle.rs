use criterion::{
    black_box, criterion_group, criterion_main, AxisScale, BenchmarkId, Criterion,
    PlotConfiguration,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

use adaptive_intersection::simulation_engine::vehicle_generator::{
    draw_arrival_delay_ms, draw_batch_size, draw_class, draw_direction,
};
use adaptive_intersection::simulation_engine::weather::WeatherCondition;

fn bench_spawn_vehicle_batches(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2025);
    let batch_sizes = [10, 20, 50];

    let mut group = c.benchmark_group("spawn_vehicle_batch");

    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Linear));

    for &batch_size in &batch_sizes {
        group.bench_with_input(
            BenchmarkId::from_parameter(batch_size),
            &batch_size,
            |b, &size| {
                b.iter(|| {
                    for _ in 0..size {
                        let class = draw_class(&mut rng, true);
                        let direction = draw_direction(&mut rng);
                        let delay = draw_arrival_delay_ms(&mut rng, WeatherCondition::Storm, 1_000);
                        black_box((class, direction, delay));
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_batch_size(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    c.bench_function("draw_batch_size", |b| {
        b.iter(|| black_box(draw_batch_size(&mut rng, false, WeatherCondition::Rain)));
    });
}

criterion_group!(benches, bench_spawn_vehicle_batches, bench_batch_size);
criterion_main!(benches);
