// control_system/mod.rs
pub mod emergency;
pub mod priority_scorer;
pub mod traffic_light_controller;

pub use traffic_light_controller::{LightState, SignalController, SignalState};
