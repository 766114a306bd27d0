use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ControlError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeatherCondition {
    #[default]
    Clear,
    Rain,
    Fog,
    Storm,
}

/// How a weather condition perturbs arrivals, scoring and efficiency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherProfile {
    pub arrival_multiplier: f64,
    /// Nominal green hold for this condition. Reported only; the controller's
    /// timings come from `SimulationConfig`.
    pub signal_hold_ms: u64,
    pub scorer_penalty: f64,
    pub efficiency_penalty: f64,
    /// Percentage shown next to the condition name in the forecast label.
    pub impact_percent: u32,
}

impl WeatherCondition {
    pub const ALL: [WeatherCondition; 4] = [
        WeatherCondition::Clear,
        WeatherCondition::Rain,
        WeatherCondition::Fog,
        WeatherCondition::Storm,
    ];

    pub fn profile(self) -> WeatherProfile {
        match self {
            WeatherCondition::Clear => WeatherProfile {
                arrival_multiplier: 1.0,
                signal_hold_ms: 4_000,
                scorer_penalty: 0.0,
                efficiency_penalty: 0.0,
                impact_percent: 0,
            },
            WeatherCondition::Rain => WeatherProfile {
                arrival_multiplier: 0.7,
                signal_hold_ms: 5_000,
                scorer_penalty: -2.0,
                efficiency_penalty: 10.0,
                impact_percent: 30,
            },
            WeatherCondition::Fog => WeatherProfile {
                arrival_multiplier: 0.5,
                signal_hold_ms: 6_000,
                scorer_penalty: -2.0,
                efficiency_penalty: 20.0,
                impact_percent: 50,
            },
            WeatherCondition::Storm => WeatherProfile {
                arrival_multiplier: 0.3,
                signal_hold_ms: 7_000,
                scorer_penalty: -2.0,
                efficiency_penalty: 30.0,
                impact_percent: 70,
            },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WeatherCondition::Clear => "CLEAR",
            WeatherCondition::Rain => "RAIN",
            WeatherCondition::Fog => "FOG",
            WeatherCondition::Storm => "STORM",
        }
    }

    /// e.g. `STORM - 70%`
    pub fn impact_label(self) -> String {
        format!("{} - {}%", self.label(), self.profile().impact_percent)
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for WeatherCondition {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clear" => Ok(WeatherCondition::Clear),
            "rain" => Ok(WeatherCondition::Rain),
            "fog" => Ok(WeatherCondition::Fog),
            "storm" => Ok(WeatherCondition::Storm),
            _ => Err(ControlError::UnknownWeather(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storm_profile() {
        let storm = WeatherCondition::Storm.profile();
        assert_eq!(storm.arrival_multiplier, 0.3);
        assert_eq!(storm.scorer_penalty, -2.0);
        assert_eq!(storm.efficiency_penalty, 30.0);
        assert_eq!(storm.signal_hold_ms, 7_000);
        assert_eq!(WeatherCondition::Storm.impact_label(), "STORM - 70%");
    }

    #[test]
    fn adverse_weather_never_speeds_arrivals() {
        let clear = WeatherCondition::Clear.profile().arrival_multiplier;
        for condition in WeatherCondition::ALL {
            assert!(condition.profile().arrival_multiplier <= clear);
        }
    }

    #[test]
    fn unknown_condition_is_rejected() {
        assert_eq!(
            "hail".parse::<WeatherCondition>(),
            Err(ControlError::UnknownWeather("hail".to_string()))
        );
        assert_eq!("Fog".parse::<WeatherCondition>(), Ok(WeatherCondition::Fog));
    }
}
