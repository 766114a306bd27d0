// simulation.rs
use rand::Rng;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{broadcast, Mutex as AsyncMutex, MutexGuard as AsyncMutexGuard};

use crate::clock::SimClock;
use crate::communication::{EventBus, LogCategory, SimEvent};
use crate::config::SimulationConfig;
use crate::control_system::traffic_light_controller::{LightState, SignalState};
use crate::error::ControlError;
use crate::global_variables::{
    INITIAL_TRAFFIC_COUNT, INITIAL_TRAFFIC_DELAY_MS, INITIAL_TRAFFIC_SPACING_MS,
    MAX_DRAIN_BATCH, MIN_DRAIN_BATCH, RESET_STANDBY_DELAY_MS,
};
use crate::shared_data::{PerformanceSample, SimulationSnapshot, SystemStatus};
use crate::simulation_engine::state::SimulationState;
use crate::simulation_engine::vehicles::{Direction, VehicleId};
use crate::simulation_engine::weather::WeatherCondition;

const ALGORITHM_STEPS: [&str; 4] = [
    "Scanning all traffic lanes...",
    "Computing priority scores...",
    "Optimizing signal timing...",
    "Processing vehicle flow...",
];

#[derive(Debug)]
struct Inner {
    config: SimulationConfig,
    clock: SimClock,
    state: Mutex<SimulationState>,
    /// Held by a cycle drain, and by the whole emergency preemption sequence.
    right_of_way: AsyncMutex<()>,
    events: EventBus,
}

/// Handle to one intersection controller. Cheap to clone; every clone drives the
/// same intersection.
///
/// Must be used from within a Tokio runtime: the control cycle, the arrival
/// generator and every delayed action run as spawned tasks.
#[derive(Debug, Clone)]
pub struct Simulation {
    inner: Arc<Inner>,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Self {
        let events = EventBus::new(config.event_capacity);
        let state = SimulationState::new(events.clone(), config.history_capacity, config.rng_seed);
        Self {
            inner: Arc::new(Inner {
                clock: SimClock::new(),
                state: Mutex::new(state),
                right_of_way: AsyncMutex::new(()),
                events,
                config,
            }),
        }
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, SimulationState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn clock(&self) -> &SimClock {
        &self.inner.clock
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.inner.config
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.state().is_current(generation)
    }

    pub(crate) async fn acquire_right_of_way(&self) -> AsyncMutexGuard<'_, ()> {
        self.inner.right_of_way.lock().await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SimEvent> {
        self.inner.events.subscribe()
    }

    /// Boot sequence: standby, all lights red and the initial traffic burst.
    pub fn initialize(&self) {
        let generation = {
            let mut state = self.state();
            state.show_all_red(self.clock().now_ms());
            state.set_status(SystemStatus::Standby);
            state
                .events
                .log(LogCategory::System, "Traffic controller initialized");
            state.generation
        };
        self.spawn_initial_traffic(generation);
    }

    /// Activates the controller. A no-op when already running.
    pub fn start(&self) {
        let (generation, spawn_cycle, spawn_generator) = {
            let mut state = self.state();
            if state.running {
                return;
            }
            state.running = true;
            if state.stats.processed_cars == 0 && state.history.is_empty() {
                state.session_started_ms = self.clock().now_ms();
            }
            state.set_status(SystemStatus::Active);
            state
                .events
                .log(LogCategory::System, "Traffic control system activated");
            let spawn_cycle = !state.control_loop_active;
            state.control_loop_active = true;
            let spawn_generator = !state.generator_active;
            state.generator_active = true;
            (state.generation, spawn_cycle, spawn_generator)
        };

        if spawn_cycle {
            tokio::spawn(self.clone().run_control_loop(generation));
        }
        if spawn_generator {
            tokio::spawn(self.clone().run_generator(generation));
        }
    }

    /// Stops scheduling cycles and forces every light red. Delays already in
    /// flight finish, but nothing they lead to is granted or drained.
    ///
    /// An in-flight cycle is cut short: it stops at its next algorithm step, and a
    /// drain under way stops before its next departure. The lights stay all-red
    /// until [`Simulation::start`].
    pub fn pause(&self) {
        let mut state = self.state();
        state.running = false;
        state.set_status(SystemStatus::Paused);
        state.show_all_red(self.clock().now_ms());
        state
            .events
            .log(LogCategory::System, "System paused by operator");
    }

    /// Discards the session and starts a fresh one in `Reset`, returning to
    /// `Standby` (with new initial traffic) shortly after. A `start()` in between
    /// keeps the controller `Active`.
    pub fn reset(&self) {
        let generation = {
            let mut state = self.state();
            state.reset(self.clock().now_ms());
            state.events.log(
                LogCategory::System,
                "System reset completed. All subsystems reinitialized.",
            );
            state.generation
        };

        let sim = self.clone();
        tokio::spawn(async move {
            sim.clock().sleep_ms(RESET_STANDBY_DELAY_MS).await;
            let mut state = sim.state();
            if state.is_current(generation) {
                if state.status == SystemStatus::Reset {
                    state.set_status(SystemStatus::Standby);
                }
                drop(state);
                sim.spawn_initial_traffic(generation);
            }
        });
    }

    fn spawn_initial_traffic(&self, generation: u64) {
        if !self.config().seed_initial_traffic {
            return;
        }
        let sim = self.clone();
        tokio::spawn(async move {
            sim.clock().sleep_ms(INITIAL_TRAFFIC_DELAY_MS).await;
            sim.seed_initial_traffic(generation, INITIAL_TRAFFIC_COUNT, INITIAL_TRAFFIC_SPACING_MS)
                .await;
        });
    }

    /// Schedules one arrival (random lane when `None`). The vehicle shows up in its
    /// queue after the weather-scaled arrival delay.
    pub fn submit_arrival(&self, direction: Option<Direction>) -> VehicleId {
        self.schedule_arrival(direction)
    }

    pub fn set_weather(&self, weather: WeatherCondition) {
        self.state().set_weather(weather);
    }

    /// Unknown conditions leave the weather untouched.
    pub fn set_weather_named(&self, name: &str) -> Result<WeatherCondition, ControlError> {
        let weather = name.parse::<WeatherCondition>().map_err(|e| {
            log::warn!("ignoring weather change: {}", e);
            e
        })?;
        self.set_weather(weather);
        Ok(weather)
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        self.state().snapshot(self.clock().now_ms())
    }

    pub fn history(&self) -> Vec<PerformanceSample> {
        self.state().history.iter().cloned().collect()
    }

    pub fn signal_state(&self) -> SignalState {
        self.state().signal.state()
    }

    pub fn queue_lengths(&self) -> [usize; 4] {
        self.state().queues.lengths()
    }

    pub fn command_history(&self) -> Vec<String> {
        self.state().command_history.clone()
    }

    async fn run_control_loop(self, generation: u64) {
        loop {
            {
                let mut state = self.state();
                if !state.is_active(generation) {
                    if state.is_current(generation) {
                        state.control_loop_active = false;
                    }
                    return;
                }
            }
            self.run_cycle(generation).await;
            self.clock().sleep_ms(self.config().cycle_settle_ms).await;
        }
    }

    /// Waits out the step pacing and announces the step. `false` once the session
    /// is paused or gone.
    async fn algorithm_step(&self, step: u8, generation: u64) -> bool {
        self.clock().sleep_ms(self.config().step_pacing_ms).await;
        let state = self.state();
        if !state.is_active(generation) {
            return false;
        }
        state.events.emit(SimEvent::AlgorithmStep {
            step,
            description: ALGORITHM_STEPS[usize::from(step - 1)].to_string(),
        });
        true
    }

    /// One scan -> score -> retarget -> drain cycle.
    async fn run_cycle(&self, generation: u64) {
        if !self.algorithm_step(1, generation).await {
            return;
        }
        self.state().scan_lanes(self.clock().now_ms());

        if !self.algorithm_step(2, generation).await {
            return;
        }
        let target = self.state().select_direction(self.clock().now_ms());
        log::debug!("cycle target {}", target);

        if !self.algorithm_step(3, generation).await {
            return;
        }
        let granted = self.change_signal(target, generation).await;
        if self.algorithm_step(4, generation).await && granted {
            let _right_of_way = self.acquire_right_of_way().await;
            self.process_cars(target, false, generation).await;
        }

        let now = self.clock().now_ms();
        let mut state = self.state();
        if state.is_current(generation) {
            state.sample_performance(now);
            state.publish_metrics(now);
        }
    }

    /// Drains a batch from `direction`: the whole queue for an emergency, otherwise
    /// three to six vehicles. Must be called with the right-of-way token held.
    ///
    /// Only a lane showing green drains; the drain stops early if it loses the
    /// green.
    pub(crate) async fn process_cars(&self, direction: Direction, emergency: bool, generation: u64) {
        let batch = {
            let mut state = self.state();
            let queued = state.queues.len(direction);
            if queued == 0 || state.signal.state().phase_of(direction) != LightState::Green {
                return;
            }
            let batch = if emergency {
                queued
            } else {
                queued.min(state.rng.random_range(MIN_DRAIN_BATCH..=MAX_DRAIN_BATCH))
            };
            state.queues.begin_drain(direction);
            batch
        };

        let spacing = self.config().drain_spacing_ms;
        for _ in 0..batch {
            {
                let now = self.clock().now_ms();
                let mut state = self.state();
                if !state.is_current(generation) {
                    return;
                }
                if !state.running || state.signal.state().phase_of(direction) != LightState::Green {
                    break;
                }
                let Some(mut vehicle) = state.queues.take_next(direction) else {
                    break;
                };
                state.record_departure(&mut vehicle, now);
            }
            self.clock().sleep_ms(spacing).await;
        }

        let now = self.clock().now_ms();
        let mut state = self.state();
        if !state.is_current(generation) {
            return;
        }
        let deferred = state.queues.end_drain(direction);
        if deferred > 0 {
            log::debug!("{} deferred arrivals released into {} lane", deferred, direction);
        }
        state.recompute_efficiency();
        state.refresh_forecasts();
        state.publish_metrics(now);
    }
}
