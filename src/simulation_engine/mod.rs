// simulation_engine/mod.rs
pub mod queues;
pub mod simulation;
pub mod state;
pub mod vehicle_generator;
pub mod vehicles;
pub mod weather;
