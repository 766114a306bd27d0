use crate::simulation_engine::queues::QueueStore;
use crate::simulation_engine::vehicles::{Direction, Vehicle};
use crate::simulation_engine::weather::WeatherCondition;

/// Per-vehicle wait bonus grows one point per 8 seconds waited, up to 3.
const WAIT_BONUS_DIVISOR_SECS: f64 = 8.0;
const WAIT_BONUS_CAP: f64 = 3.0;
const EMERGENCY_BONUS: f64 = 50.0;
const QUEUE_LENGTH_FACTOR: f64 = 0.7;

/// Demand score of one queue. Higher means more deserving of the green.
pub fn score_queue<'a>(
    vehicles: impl IntoIterator<Item = &'a Vehicle>,
    weather: WeatherCondition,
    now_ms: u64,
) -> f64 {
    let mut priority_sum = 0.0;
    let mut wait_bonus = 0.0;
    let mut emergency_bonus = 0.0;
    let mut queue_length = 0usize;

    for vehicle in vehicles {
        priority_sum += f64::from(vehicle.priority_weight());
        wait_bonus += (vehicle.waited_secs(now_ms) / WAIT_BONUS_DIVISOR_SECS).min(WAIT_BONUS_CAP);
        if vehicle.is_emergency() {
            emergency_bonus += EMERGENCY_BONUS;
        }
        queue_length += 1;
    }

    priority_sum
        + wait_bonus
        + emergency_bonus
        + queue_length as f64 * QUEUE_LENGTH_FACTOR
        + weather.profile().scorer_penalty
}

/// Scores of every non-empty queue, in N, S, E, W order.
pub fn score_all(
    queues: &QueueStore,
    weather: WeatherCondition,
    now_ms: u64,
) -> Vec<(Direction, f64)> {
    Direction::ALL
        .iter()
        .filter(|&&d| !queues.is_empty(d))
        .map(|&d| (d, score_queue(queues.vehicles(d), weather, now_ms)))
        .collect()
}

/// Picks the direction to serve next.
///
/// The strictly greatest score wins, so ties go to the direction that comes first
/// in N, S, E, W order. With every queue empty the current direction is kept.
pub fn select_direction(
    queues: &QueueStore,
    weather: WeatherCondition,
    now_ms: u64,
    current: Direction,
) -> Direction {
    let mut best: Option<(Direction, f64)> = None;
    for (direction, score) in score_all(queues, weather, now_ms) {
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((direction, score)),
        }
    }
    best.map(|(direction, _)| direction).unwrap_or(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation_engine::vehicles::{EmergencyKind, VehicleClass, VehicleId};

    fn push(store: &mut QueueStore, id: u64, direction: Direction, class: VehicleClass, t: u64) {
        store.push(direction, Vehicle::new(VehicleId(id), class, direction, t), false);
    }

    #[test]
    fn empty_queues_keep_current_direction() {
        let store = QueueStore::new();
        assert_eq!(
            select_direction(&store, WeatherCondition::Clear, 0, Direction::West),
            Direction::West
        );
    }

    #[test]
    fn score_formula() {
        let mut store = QueueStore::new();
        push(&mut store, 1, Direction::North, VehicleClass::Normal, 0);
        push(&mut store, 2, Direction::North, VehicleClass::Priority, 4_000);
        // at t=16s: weights 1+3, wait bonus min(2,3)+min(1.5,3), length 2*0.7
        let score = score_queue(store.vehicles(Direction::North), WeatherCondition::Clear, 16_000);
        assert!((score - (4.0 + 3.5 + 1.4)).abs() < 1e-9);

        let rainy = score_queue(store.vehicles(Direction::North), WeatherCondition::Rain, 16_000);
        assert!((score - rainy - 2.0).abs() < 1e-9);
    }

    #[test]
    fn wait_bonus_is_capped() {
        let mut store = QueueStore::new();
        push(&mut store, 1, Direction::East, VehicleClass::Normal, 0);
        let score = score_queue(store.vehicles(Direction::East), WeatherCondition::Clear, 600_000);
        assert!((score - (1.0 + 3.0 + 0.7)).abs() < 1e-9);
    }

    #[test]
    fn ties_go_to_earlier_direction() {
        let mut store = QueueStore::new();
        push(&mut store, 1, Direction::West, VehicleClass::Normal, 0);
        push(&mut store, 2, Direction::South, VehicleClass::Normal, 0);
        assert_eq!(
            select_direction(&store, WeatherCondition::Clear, 0, Direction::North),
            Direction::South
        );
    }

    #[test]
    fn emergency_outweighs_long_queue() {
        let mut store = QueueStore::new();
        for id in 0..10 {
            push(&mut store, id, Direction::North, VehicleClass::Normal, 0);
        }
        push(
            &mut store,
            99,
            Direction::East,
            VehicleClass::Emergency(EmergencyKind::Police),
            0,
        );
        assert_eq!(
            select_direction(&store, WeatherCondition::Storm, 1_000, Direction::North),
            Direction::East
        );
    }

    #[test]
    fn negative_scores_still_win_over_empty_queues() {
        let mut store = QueueStore::new();
        push(&mut store, 1, Direction::West, VehicleClass::Normal, 0);
        // 1 + 0 + 0.7 - 2 < 0
        assert!(score_queue(store.vehicles(Direction::West), WeatherCondition::Fog, 0) < 0.0);
        assert_eq!(
            select_direction(&store, WeatherCondition::Fog, 0, Direction::North),
            Direction::West
        );
    }
}
