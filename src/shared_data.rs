// src/shared_data.rs

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::control_system::traffic_light_controller::SignalState;
use crate::flow_analyzer::predictive_model::CongestionForecast;
use crate::simulation_engine::vehicles::Direction;
use crate::simulation_engine::weather::WeatherCondition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SystemStatus {
    #[default]
    Standby,
    Active,
    Paused,
    Reset,
}

impl fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            SystemStatus::Standby => "STANDBY",
            SystemStatus::Active => "ACTIVE",
            SystemStatus::Paused => "PAUSED",
            SystemStatus::Reset => "RESET",
        };
        f.write_str(label)
    }
}

/// Running totals maintained by the drain and the arrival path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficStats {
    pub total_vehicles: u64,
    pub total_wait_ms: u64,
    pub processed_cars: u64,
    pub efficiency: f64,
    pub throughput: u64,
}

impl Default for TrafficStats {
    fn default() -> Self {
        Self {
            total_vehicles: 0,
            total_wait_ms: 0,
            processed_cars: 0,
            efficiency: 100.0,
            throughput: 0,
        }
    }
}

impl TrafficStats {
    pub fn average_wait_secs(&self) -> f64 {
        if self.processed_cars == 0 {
            0.0
        } else {
            self.total_wait_ms as f64 / 1000.0 / self.processed_cars as f64
        }
    }
}

/// One point of the bounded performance history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSample {
    pub timestamp_ms: u64,
    pub efficiency: f64,
    pub throughput: u64,
    pub total_queue_length: usize,
}

/// Payload of `SimEvent::MetricsUpdated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp_ms: u64,
    pub total_vehicles: u64,
    pub processed_cars: u64,
    pub average_wait_secs: f64,
    pub efficiency: f64,
    pub throughput: u64,
    pub total_queue_length: usize,
    pub emergency_mode: bool,
    pub rush_hour_active: bool,
    pub weather: WeatherCondition,
}

/// Everything a dashboard needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    pub status: SystemStatus,
    pub uptime_ms: u64,
    pub metrics: MetricsSnapshot,
    pub signal: SignalState,
    pub current_direction: Direction,
    /// Queue lengths in N, S, E, W order.
    pub queue_lengths: [usize; 4],
    /// Average wait in seconds per lane, as of the last scan step.
    pub lane_average_wait_secs: [f64; 4],
    pub active_emergencies: usize,
    pub congestion: CongestionForecast,
    pub weather_impact: String,
}
