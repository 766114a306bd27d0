// monitoring/mod.rs
pub mod command_processor;
pub mod report;
