use log::Level;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::shared_data::{MetricsSnapshot, SystemStatus};
use crate::simulation_engine::vehicles::{Direction, VehicleClass, VehicleId};
use crate::simulation_engine::weather::WeatherCondition;
use crate::control_system::traffic_light_controller::LightState;

/// Category of an operator-facing log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogCategory {
    System,
    Traffic,
    Emergency,
    Info,
}

impl LogCategory {
    pub fn tag(self) -> &'static str {
        match self {
            LogCategory::System => "[SYS]",
            LogCategory::Traffic => "[TRF]",
            LogCategory::Emergency => "[EMG]",
            LogCategory::Info => "[INF]",
        }
    }

    fn level(self) -> Level {
        match self {
            LogCategory::Emergency => Level::Warn,
            LogCategory::System => Level::Info,
            LogCategory::Traffic | LogCategory::Info => Level::Debug,
        }
    }
}

/// Everything the controller tells its collaborators (renderers, dashboards, logs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    VehicleArrived {
        id: VehicleId,
        direction: Direction,
        class: VehicleClass,
        arrival_ms: u64,
    },
    VehicleDeparted {
        id: VehicleId,
        direction: Direction,
        class: VehicleClass,
        arrival_ms: u64,
        departed_ms: u64,
        wait_ms: u64,
    },
    SignalChanged {
        direction: Direction,
        phase: LightState,
        at_ms: u64,
    },
    EmergencyTriggered {
        direction: Direction,
        vehicle: VehicleId,
    },
    EmergencyCleared,
    MetricsUpdated(MetricsSnapshot),
    StatusChanged(SystemStatus),
    WeatherChanged(WeatherCondition),
    RushHourChanged(bool),
    AlgorithmStep {
        step: u8,
        description: String,
    },
    LogLine {
        message: String,
        category: LogCategory,
    },
}

/// Fan-out of `SimEvent`s. Sending never blocks and never fails: with no
/// subscribers the event is simply dropped.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SimEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SimEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: SimEvent) {
        let _ = self.sender.send(event);
    }

    /// Emits a `LogLine` and mirrors it to the `log` facade.
    pub fn log(&self, category: LogCategory, message: impl Into<String>) {
        let message = message.into();
        log::log!(category.level(), "{} {}", category.tag(), message);
        self.emit(SimEvent::LogLine { message, category });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_without_subscribers_is_silent() {
        let bus = EventBus::new(4);
        bus.emit(SimEvent::EmergencyCleared);
        bus.log(LogCategory::System, "nobody listening");
    }

    #[test]
    fn subscribers_receive_log_lines() {
        let bus = EventBus::new(4);
        let mut rx = bus.subscribe();
        bus.log(LogCategory::Emergency, "corridor cleared");
        assert_eq!(
            rx.try_recv().ok(),
            Some(SimEvent::LogLine {
                message: "corridor cleared".to_string(),
                category: LogCategory::Emergency,
            })
        );
    }
}
