use criterion::{
    black_box, criterion_group, criterion_main, AxisScale, BenchmarkId, Criterion,
    PlotConfiguration,
};

use adaptive_intersection::control_system::priority_scorer::select_direction;
use adaptive_intersection::simulation_engine::queues::QueueStore;
use adaptive_intersection::simulation_engine::vehicles::{
    Direction, EmergencyKind, Vehicle, VehicleClass, VehicleId,
};
use adaptive_intersection::simulation_engine::weather::WeatherCondition;

/// Fills every lane with `per_lane` vehicles; every tenth is priority and one lane
/// carries an emergency.
fn build_queues(per_lane: usize) -> QueueStore {
    let mut queues = QueueStore::new();
    let mut next_id = 1;
    for direction in Direction::ALL {
        for i in 0..per_lane {
            let class = if direction == Direction::West && i == per_lane / 2 {
                VehicleClass::Emergency(EmergencyKind::Fire)
            } else if i % 10 == 0 {
                VehicleClass::Priority
            } else {
                VehicleClass::Normal
            };
            let vehicle = Vehicle::new(VehicleId(next_id), class, direction, i as u64 * 250);
            queues.push(direction, vehicle, false);
            next_id += 1;
        }
    }
    queues
}

fn bench_select_direction(c: &mut Criterion) {
    let lane_sizes = [5, 20, 100];

    let mut group = c.benchmark_group("select_direction");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Linear));

    for &per_lane in &lane_sizes {
        let queues = build_queues(per_lane);
        group.bench_with_input(BenchmarkId::from_parameter(per_lane), &queues, |b, queues| {
            b.iter(|| {
                let direction = select_direction(
                    black_box(queues),
                    WeatherCondition::Rain,
                    60_000,
                    Direction::North,
                );
                black_box(direction);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_select_direction);
criterion_main!(benches);
