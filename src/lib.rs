pub mod clock;
pub mod communication;
pub mod config;
pub mod control_system;
pub mod error;
pub mod flow_analyzer;
pub mod global_variables;
pub mod monitoring;
pub mod shared_data;
pub mod simulation_engine;

pub use communication::{LogCategory, SimEvent};
pub use config::SimulationConfig;
pub use error::{ConfigError, ControlError, SignalError};
pub use simulation_engine::simulation::Simulation;
pub use simulation_engine::vehicles::{Direction, EmergencyKind, VehicleClass, VehicleId};
pub use simulation_engine::weather::WeatherCondition;
