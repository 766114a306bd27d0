use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeSet;

use crate::communication::{EventBus, LogCategory, SimEvent};
use crate::control_system::priority_scorer;
use crate::control_system::traffic_light_controller::{PhaseChanges, SignalController};
use crate::error::SignalError;
use crate::flow_analyzer::{
    compute_efficiency, compute_throughput, predict_congestion, CongestionForecast,
    PerformanceHistory, RushHourDetector,
};
use crate::shared_data::{
    MetricsSnapshot, PerformanceSample, SimulationSnapshot, SystemStatus, TrafficStats,
};
use crate::simulation_engine::queues::QueueStore;
use crate::simulation_engine::vehicles::{Direction, Vehicle, VehicleId};
use crate::simulation_engine::weather::WeatherCondition;

/// The single mutable state of one intersection controller.
///
/// Only reachable through `Simulation`, behind its mutex. Methods here never
/// suspend; the timed sequences live on `Simulation`.
#[derive(Debug)]
pub struct SimulationState {
    pub queues: QueueStore,
    pub signal: SignalController,
    pub stats: TrafficStats,
    pub current_direction: Direction,
    pub weather: WeatherCondition,
    pub emergency_mode: bool,
    pub active_emergencies: BTreeSet<VehicleId>,
    pub rush_hour: RushHourDetector,
    pub congestion: CongestionForecast,
    pub history: PerformanceHistory,
    pub status: SystemStatus,
    pub running: bool,
    /// Bumped by every reset; timers armed under an older value are ignored.
    pub generation: u64,
    /// Clock reading at which the current session began.
    pub session_started_ms: u64,
    pub lane_average_wait_secs: [f64; 4],
    pub command_history: Vec<String>,
    pub(crate) control_loop_active: bool,
    pub(crate) generator_active: bool,
    /// Emergency preemptions spawned and not yet finished. A control cycle that
    /// sees one mid-switch gives up its turn.
    pub(crate) preemptions_pending: usize,
    pub(crate) rng: StdRng,
    pub(crate) events: EventBus,
    next_vehicle_id: u64,
}

impl SimulationState {
    pub fn new(events: EventBus, history_capacity: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };
        Self {
            queues: QueueStore::new(),
            signal: SignalController::new(),
            stats: TrafficStats::default(),
            current_direction: Direction::North,
            weather: WeatherCondition::Clear,
            emergency_mode: false,
            active_emergencies: BTreeSet::new(),
            rush_hour: RushHourDetector::default(),
            congestion: CongestionForecast::None,
            history: PerformanceHistory::new(history_capacity),
            status: SystemStatus::Standby,
            running: false,
            generation: 0,
            session_started_ms: 0,
            lane_average_wait_secs: [0.0; 4],
            command_history: Vec::new(),
            control_loop_active: false,
            generator_active: false,
            preemptions_pending: 0,
            rng,
            events,
            next_vehicle_id: 1,
        }
    }

    /// Still in the session identified by `generation`.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Still in that session and not paused.
    pub fn is_active(&self, generation: u64) -> bool {
        self.is_current(generation) && self.running
    }

    pub fn next_vehicle_id(&mut self) -> VehicleId {
        let id = VehicleId(self.next_vehicle_id);
        self.next_vehicle_id += 1;
        id
    }

    pub fn set_status(&mut self, status: SystemStatus) {
        if self.status != status {
            self.status = status;
            self.events.emit(SimEvent::StatusChanged(status));
        }
    }

    /// Puts a vehicle in its queue and updates the totals. Emergency vehicles are
    /// registered as active; triggering preemption is left to the caller.
    pub fn admit(&mut self, vehicle: Vehicle, at_head: bool) {
        let direction = vehicle.direction;
        if vehicle.is_emergency() {
            self.active_emergencies.insert(vehicle.id);
        }
        self.stats.total_vehicles += 1;
        self.events.emit(SimEvent::VehicleArrived {
            id: vehicle.id,
            direction,
            class: vehicle.class,
            arrival_ms: vehicle.arrival_ms,
        });
        self.events.log(
            LogCategory::Traffic,
            format!("Vehicle {} ({}) entered {} lane", vehicle.id, vehicle.class, direction),
        );
        if !self.queues.push(direction, vehicle, at_head) {
            log::debug!("{} lane is draining, arrival deferred", direction);
        }
        self.refresh_forecasts();
    }

    /// Accounts for one drained vehicle, stamping its wait time.
    pub fn record_departure(&mut self, vehicle: &mut Vehicle, now_ms: u64) {
        let wait_ms = vehicle.depart(now_ms);
        self.stats.total_wait_ms += wait_ms;
        self.stats.processed_cars += 1;

        let wait_secs = wait_ms as f64 / 1000.0;
        if vehicle.is_emergency() {
            self.active_emergencies.remove(&vehicle.id);
            self.events.log(
                LogCategory::Emergency,
                format!("Emergency vehicle {} cleared intersection ({:.1}s)", vehicle.id, wait_secs),
            );
        } else {
            self.events.log(
                LogCategory::Info,
                format!(
                    "Vehicle {} processed from {} ({:.1}s wait)",
                    vehicle.id, vehicle.direction, wait_secs
                ),
            );
        }
        self.events.emit(SimEvent::VehicleDeparted {
            id: vehicle.id,
            direction: vehicle.direction,
            class: vehicle.class,
            arrival_ms: vehicle.arrival_ms,
            departed_ms: now_ms,
            wait_ms,
        });
    }

    /// Rush-hour hysteresis and the congestion forecast, from the queued totals.
    pub fn refresh_forecasts(&mut self) {
        self.congestion = predict_congestion(self.queues.lengths());
        if let Some(active) = self.rush_hour.observe(self.queues.total_len()) {
            if active {
                self.events.log(
                    LogCategory::System,
                    "Rush hour pattern detected. Adjusting traffic algorithms.",
                );
            } else {
                self.events.log(LogCategory::System, "Rush hour pattern ended.");
            }
            self.events.emit(SimEvent::RushHourChanged(active));
        }
    }

    pub fn recompute_efficiency(&mut self) {
        self.stats.efficiency = compute_efficiency(
            self.stats.average_wait_secs(),
            self.queues.total_len(),
            self.weather,
            self.emergency_mode,
        );
    }

    /// Scan step of the control cycle: per-lane average wait as of `now_ms`.
    pub fn scan_lanes(&mut self, now_ms: u64) {
        for direction in Direction::ALL {
            let (count, total) = self
                .queues
                .vehicles(direction)
                .fold((0usize, 0.0), |(n, sum), v| (n + 1, sum + v.waited_secs(now_ms)));
            self.lane_average_wait_secs[direction.index()] =
                if count == 0 { 0.0 } else { total / count as f64 };
        }
    }

    pub fn select_direction(&self, now_ms: u64) -> Direction {
        priority_scorer::select_direction(&self.queues, self.weather, now_ms, self.current_direction)
    }

    /// End-of-cycle bookkeeping: throughput and a history sample.
    pub fn sample_performance(&mut self, now_ms: u64) -> PerformanceSample {
        let uptime = now_ms.saturating_sub(self.session_started_ms);
        self.stats.throughput = compute_throughput(self.stats.processed_cars, uptime);
        let sample = PerformanceSample {
            timestamp_ms: now_ms,
            efficiency: self.stats.efficiency,
            throughput: self.stats.throughput,
            total_queue_length: self.queues.total_len(),
        };
        self.history.record(sample.clone());
        sample
    }

    pub fn metrics(&self, now_ms: u64) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp_ms: now_ms,
            total_vehicles: self.stats.total_vehicles,
            processed_cars: self.stats.processed_cars,
            average_wait_secs: self.stats.average_wait_secs(),
            efficiency: self.stats.efficiency,
            throughput: self.stats.throughput,
            total_queue_length: self.queues.total_len(),
            emergency_mode: self.emergency_mode,
            rush_hour_active: self.rush_hour.is_active(),
            weather: self.weather,
        }
    }

    pub fn publish_metrics(&self, now_ms: u64) {
        self.events.emit(SimEvent::MetricsUpdated(self.metrics(now_ms)));
    }

    pub fn snapshot(&self, now_ms: u64) -> SimulationSnapshot {
        SimulationSnapshot {
            status: self.status,
            uptime_ms: now_ms.saturating_sub(self.session_started_ms),
            metrics: self.metrics(now_ms),
            signal: self.signal.state(),
            current_direction: self.current_direction,
            queue_lengths: self.queues.lengths(),
            lane_average_wait_secs: self.lane_average_wait_secs,
            active_emergencies: self.active_emergencies.len(),
            congestion: self.congestion,
            weather_impact: self.weather.impact_label(),
        }
    }

    fn publish_phases(&self, changes: PhaseChanges, now_ms: u64) {
        for (direction, phase) in changes {
            self.events.emit(SimEvent::SignalChanged {
                direction,
                phase,
                at_ms: now_ms,
            });
        }
    }

    pub fn show_yellow(&mut self, now_ms: u64) -> Result<Direction, SignalError> {
        let (direction, changes) = self.signal.show_yellow()?;
        self.publish_phases(changes, now_ms);
        Ok(direction)
    }

    pub fn show_all_red(&mut self, now_ms: u64) {
        let changes = self.signal.force_all_red();
        self.publish_phases(changes, now_ms);
    }

    pub fn show_green(&mut self, direction: Direction, now_ms: u64) -> Result<(), SignalError> {
        let changes = self.signal.grant_green(direction)?;
        self.publish_phases(changes, now_ms);
        Ok(())
    }

    pub fn set_weather(&mut self, weather: WeatherCondition) {
        self.weather = weather;
        self.events.emit(SimEvent::WeatherChanged(weather));
        self.events.log(
            LogCategory::System,
            format!("Weather conditions changed to {}. Traffic flow adjusted.", weather),
        );
    }

    /// Wipes the session: queues, totals, flags, history and signals. Bumps the
    /// generation so every timer armed before this call becomes a no-op.
    pub fn reset(&mut self, now_ms: u64) {
        self.generation += 1;
        self.running = false;
        self.control_loop_active = false;
        self.generator_active = false;
        self.preemptions_pending = 0;
        self.queues.clear_all();
        self.stats = TrafficStats::default();
        self.current_direction = Direction::North;
        self.weather = WeatherCondition::Clear;
        self.emergency_mode = false;
        self.active_emergencies.clear();
        self.rush_hour.reset();
        self.congestion = CongestionForecast::None;
        self.history.clear();
        self.lane_average_wait_secs = [0.0; 4];
        self.session_started_ms = now_ms;
        self.next_vehicle_id = 1;
        self.show_all_red(now_ms);
        self.set_status(SystemStatus::Reset);
    }
}
