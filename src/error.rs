use thiserror::Error;

use crate::simulation_engine::vehicles::Direction;

/// Rejected operator input. None of these are fatal; the caller decides whether to
/// log, reply, or ignore.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("unrecognized weather condition: {0}")]
    UnknownWeather(String),
    #[error("unrecognized emergency kind: {0}")]
    UnknownEmergencyKind(String),
    #[error("unrecognized direction: {0}")]
    UnknownDirection(String),
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

/// A phase change the signal state machine refused to perform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    #[error("cannot show yellow: no direction is green (signal is {0})")]
    NothingGreen(String),
    #[error("cannot grant green to {requested:?}: signal is {current}, expected all-red")]
    NotAllRed { requested: Direction, current: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}
