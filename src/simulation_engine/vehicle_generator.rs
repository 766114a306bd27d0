use rand::Rng;
use std::time::Duration;
use tokio::time::{interval_at, Instant};

use crate::global_variables::RUSH_HOUR_BATCH_MULTIPLIER;
use crate::simulation_engine::simulation::Simulation;
use crate::simulation_engine::vehicles::{Direction, EmergencyKind, Vehicle, VehicleClass, VehicleId};
use crate::simulation_engine::weather::WeatherCondition;

/// Draws a vehicle class. Rush hour raises both the emergency and the priority share.
pub fn draw_class<R: Rng>(rng: &mut R, rush_hour: bool) -> VehicleClass {
    let (p_emergency, p_priority) = if rush_hour { (0.08, 0.17) } else { (0.03, 0.12) };
    let roll: f64 = rng.random();
    if roll < p_emergency {
        let kind = EmergencyKind::ALL[rng.random_range(0..EmergencyKind::ALL.len())];
        VehicleClass::Emergency(kind)
    } else if roll < p_emergency + p_priority {
        VehicleClass::Priority
    } else {
        VehicleClass::Normal
    }
}

pub fn draw_direction<R: Rng>(rng: &mut R) -> Direction {
    Direction::ALL[rng.random_range(0..Direction::ALL.len())]
}

/// Delay before an arrival becomes visible: `uniform(0, max) * weatherMultiplier`.
pub fn draw_arrival_delay_ms<R: Rng>(
    rng: &mut R,
    weather: WeatherCondition,
    max_delay_ms: u64,
) -> u64 {
    let base: f64 = rng.random::<f64>() * max_delay_ms as f64;
    (base * weather.profile().arrival_multiplier) as u64
}

/// `floor(roll * rushMultiplier * weatherMultiplier)` for a roll in `[1, 4)`.
pub fn batch_size(roll: f64, rush_hour: bool, weather: WeatherCondition) -> usize {
    let rush = if rush_hour { RUSH_HOUR_BATCH_MULTIPLIER } else { 1.0 };
    (roll * rush * weather.profile().arrival_multiplier).floor() as usize
}

pub fn draw_batch_size<R: Rng>(
    rng: &mut R,
    rush_hour: bool,
    weather: WeatherCondition,
) -> usize {
    batch_size(rng.random_range(1.0..4.0), rush_hour, weather)
}

/// An arrival that has been decided but is not yet visible in its queue.
#[derive(Debug, Clone, Copy)]
struct PlannedArrival {
    id: VehicleId,
    class: VehicleClass,
    direction: Direction,
    delay_ms: u64,
    generation: u64,
}

impl Simulation {
    /// Decides a new arrival and schedules it.
    pub(crate) fn schedule_arrival(&self, direction: Option<Direction>) -> VehicleId {
        let planned = {
            let mut state = self.state();
            let rush_hour = state.rush_hour.is_active();
            let weather = state.weather;
            let max_delay = self.config().max_arrival_delay_ms;
            let direction = direction.unwrap_or_else(|| draw_direction(&mut state.rng));
            let class = draw_class(&mut state.rng, rush_hour);
            let delay_ms = draw_arrival_delay_ms(&mut state.rng, weather, max_delay);
            PlannedArrival {
                id: state.next_vehicle_id(),
                class,
                direction,
                delay_ms,
                generation: state.generation,
            }
        };

        let sim = self.clone();
        tokio::spawn(async move {
            sim.clock().sleep_ms(planned.delay_ms).await;
            sim.complete_arrival(planned);
        });
        planned.id
    }

    /// Generated traffic only flows while running or during an emergency.
    fn schedule_generated_arrival(&self, generation: u64) -> Option<VehicleId> {
        let open = {
            let state = self.state();
            state.is_current(generation) && (state.running || state.emergency_mode)
        };
        open.then(|| self.schedule_arrival(None))
    }

    fn complete_arrival(&self, planned: PlannedArrival) {
        let now = self.clock().now_ms();
        {
            let mut state = self.state();
            if !state.is_current(planned.generation) {
                return;
            }
            let vehicle = Vehicle::new(planned.id, planned.class, planned.direction, now);
            state.admit(vehicle, false);
        }
        if planned.class.is_emergency() {
            self.trigger_emergency(planned.direction, planned.id);
        }
    }

    /// Periodic batch generator. One instance per session; exits after a reset.
    pub(crate) async fn run_generator(self, generation: u64) {
        let period = Duration::from_millis(self.config().batch_period_ms.max(1));
        let mut ticker = interval_at(Instant::now() + period, period);
        loop {
            ticker.tick().await;
            let count = {
                let mut state = self.state();
                if !state.is_current(generation) {
                    return;
                }
                if !state.running && !state.emergency_mode {
                    continue;
                }
                let rush_hour = state.rush_hour.is_active();
                let weather = state.weather;
                draw_batch_size(&mut state.rng, rush_hour, weather)
            };
            if count > 0 {
                log::debug!("generating {} arrivals", count);
            }
            for i in 0..count {
                let sim = self.clone();
                let stagger = i as u64 * self.config().batch_stagger_ms;
                tokio::spawn(async move {
                    sim.clock().sleep_ms(stagger).await;
                    sim.schedule_generated_arrival(generation);
                });
            }
        }
    }

    /// Burst of arrivals submitted after a reset, spaced evenly.
    pub(crate) async fn seed_initial_traffic(self, generation: u64, count: usize, spacing_ms: u64) {
        for i in 0..count {
            if i > 0 {
                self.clock().sleep_ms(spacing_ms).await;
            }
            if !self.is_current(generation) {
                return;
            }
            self.schedule_arrival(None);
        }
    }
}
