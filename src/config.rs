use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::global_variables::*;

/// Timing and capacity knobs for one controller instance.
///
/// Every field has a default taken from `global_variables`, so a JSON config only
/// needs to list the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub yellow_ms: u64,
    pub all_red_ms: u64,
    pub cycle_settle_ms: u64,
    /// Pause before each of the four announced algorithm steps. May be 0.
    pub step_pacing_ms: u64,
    pub drain_spacing_ms: u64,
    pub batch_period_ms: u64,
    pub batch_stagger_ms: u64,
    pub max_arrival_delay_ms: u64,
    pub emergency_all_red_ms: u64,
    pub emergency_green_lead_ms: u64,
    pub emergency_timeout_ms: u64,
    pub history_capacity: usize,
    pub event_capacity: usize,
    /// Submit the initial burst of arrivals on `initialize` and after every reset.
    pub seed_initial_traffic: bool,
    /// Fixed RNG seed for reproducible runs; `None` draws one from the OS.
    pub rng_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            yellow_ms: YELLOW_DURATION_MS,
            all_red_ms: ALL_RED_BUFFER_MS,
            cycle_settle_ms: CYCLE_SETTLE_MS,
            step_pacing_ms: STEP_PACING_MS,
            drain_spacing_ms: DRAIN_SPACING_MS,
            batch_period_ms: BATCH_PERIOD_MS,
            batch_stagger_ms: BATCH_STAGGER_MS,
            max_arrival_delay_ms: MAX_ARRIVAL_DELAY_MS,
            emergency_all_red_ms: EMERGENCY_ALL_RED_MS,
            emergency_green_lead_ms: EMERGENCY_GREEN_LEAD_MS,
            emergency_timeout_ms: EMERGENCY_TIMEOUT_MS,
            history_capacity: HISTORY_CAPACITY,
            event_capacity: EVENT_CHANNEL_CAPACITY,
            seed_initial_traffic: true,
            rng_seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng_seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}
