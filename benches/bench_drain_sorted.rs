use criterion::{
    black_box, criterion_group, criterion_main, AxisScale, BenchmarkId, Criterion,
    PlotConfiguration,
};

use adaptive_intersection::simulation_engine::queues::QueueStore;
use adaptive_intersection::simulation_engine::vehicles::{
    Direction, EmergencyKind, Vehicle, VehicleClass, VehicleId,
};

fn build_lane(size: usize) -> QueueStore {
    let mut queues = QueueStore::new();
    for i in 0..size {
        let class = match i % 7 {
            0 => VehicleClass::Priority,
            3 if i % 21 == 3 => VehicleClass::Emergency(EmergencyKind::Ambulance),
            _ => VehicleClass::Normal,
        };
        let vehicle = Vehicle::new(VehicleId(i as u64 + 1), class, Direction::South, i as u64);
        queues.push(Direction::South, vehicle, false);
    }
    queues
}

fn bench_drain_sorted(c: &mut Criterion) {
    let queue_sizes = [6, 50, 500];

    let mut group = c.benchmark_group("drain_sorted");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Linear));

    for &size in &queue_sizes {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || build_lane(size),
                |mut queues| {
                    // full drain, as for an emergency corridor
                    let drained = queues.drain_sorted(Direction::South, size);
                    black_box(drained);
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_drain_sorted);
criterion_main!(benches);
