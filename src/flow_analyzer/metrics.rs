use std::collections::VecDeque;

use crate::global_variables::{
    MAX_EFFICIENCY, MIN_EFFICIENCY, RUSH_HOUR_OFF_BELOW, RUSH_HOUR_ON_ABOVE,
};
use crate::shared_data::PerformanceSample;
use crate::simulation_engine::weather::WeatherCondition;

const WAIT_PENALTY_PER_SEC: f64 = 1.5;
const WAIT_PENALTY_CAP: f64 = 25.0;
const QUEUE_PENALTY_PER_VEHICLE: f64 = 2.0;
const QUEUE_PENALTY_CAP: f64 = 35.0;
const EMERGENCY_BONUS: f64 = 10.0;

/// Intersection health in `[15, 100]`.
pub fn compute_efficiency(
    average_wait_secs: f64,
    total_queue_length: usize,
    weather: WeatherCondition,
    emergency_mode: bool,
) -> f64 {
    let mut efficiency = 100.0;
    efficiency -= (average_wait_secs * WAIT_PENALTY_PER_SEC).min(WAIT_PENALTY_CAP);
    efficiency -= (total_queue_length as f64 * QUEUE_PENALTY_PER_VEHICLE).min(QUEUE_PENALTY_CAP);
    efficiency -= weather.profile().efficiency_penalty;
    if emergency_mode {
        efficiency += EMERGENCY_BONUS;
    }
    efficiency.clamp(MIN_EFFICIENCY, MAX_EFFICIENCY)
}

/// Vehicles processed per minute of uptime, rounded.
pub fn compute_throughput(processed_cars: u64, uptime_ms: u64) -> u64 {
    if processed_cars == 0 || uptime_ms == 0 {
        return 0;
    }
    let minutes = uptime_ms as f64 / 60_000.0;
    (processed_cars as f64 / minutes).round() as u64
}

/// Bounded FIFO of performance samples; the oldest is evicted on overflow.
#[derive(Debug, Clone)]
pub struct PerformanceHistory {
    capacity: usize,
    samples: VecDeque<PerformanceSample>,
}

impl PerformanceHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            samples: VecDeque::with_capacity(capacity),
        }
    }

    pub fn record(&mut self, sample: PerformanceSample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<&PerformanceSample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PerformanceSample> {
        self.samples.iter()
    }

    pub fn average_efficiency(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().map(|s| s.efficiency).sum::<f64>() / self.samples.len() as f64
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Rush-hour detector with a hysteresis band: on above 20 queued vehicles, off
/// below 8, unchanged in between.
#[derive(Debug, Clone, Copy, Default)]
pub struct RushHourDetector {
    active: bool,
}

impl RushHourDetector {
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Feeds the current queued total. Returns the new state if it flipped.
    pub fn observe(&mut self, total_queued: usize) -> Option<bool> {
        if total_queued > RUSH_HOUR_ON_ABOVE && !self.active {
            self.active = true;
            Some(true)
        } else if total_queued < RUSH_HOUR_OFF_BELOW && self.active {
            self.active = false;
            Some(false)
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_clear_intersection_is_perfect() {
        assert_eq!(compute_efficiency(0.0, 0, WeatherCondition::Clear, false), 100.0);
    }

    #[test]
    fn efficiency_penalties_cap() {
        // 25 + 35 + 30 = 90 -> floored at 15
        assert_eq!(compute_efficiency(1_000.0, 500, WeatherCondition::Storm, false), 15.0);
        // 100 - 15 - 10 - 10 + 10
        let e = compute_efficiency(10.0, 5, WeatherCondition::Rain, true);
        assert!((e - 75.0).abs() < 1e-9);
    }

    #[test]
    fn emergency_bonus_never_exceeds_hundred() {
        assert_eq!(compute_efficiency(0.0, 0, WeatherCondition::Clear, true), 100.0);
    }

    #[test]
    fn efficiency_stays_in_bounds() {
        for wait in [0.0, 3.3, 17.0, 400.0] {
            for queued in [0, 4, 17, 90] {
                for weather in WeatherCondition::ALL {
                    for emergency in [false, true] {
                        let e = compute_efficiency(wait, queued, weather, emergency);
                        assert!((15.0..=100.0).contains(&e), "{e} out of bounds");
                    }
                }
            }
        }
    }

    #[test]
    fn throughput_per_minute() {
        assert_eq!(compute_throughput(0, 60_000), 0);
        assert_eq!(compute_throughput(10, 0), 0);
        assert_eq!(compute_throughput(30, 120_000), 15);
        assert_eq!(compute_throughput(7, 90_000), 5);
    }

    #[test]
    fn history_evicts_oldest() {
        let mut history = PerformanceHistory::new(50);
        for i in 0..60u64 {
            history.record(PerformanceSample {
                timestamp_ms: i,
                efficiency: 100.0,
                throughput: 0,
                total_queue_length: 0,
            });
        }
        assert_eq!(history.len(), 50);
        assert_eq!(history.iter().next().map(|s| s.timestamp_ms), Some(10));
        assert_eq!(history.latest().map(|s| s.timestamp_ms), Some(59));
    }

    #[test]
    fn rush_hour_hysteresis() {
        let mut rush = RushHourDetector::default();
        assert_eq!(rush.observe(5), None);
        assert_eq!(rush.observe(20), None);
        assert_eq!(rush.observe(21), Some(true));
        for queued in [20, 14, 8] {
            assert_eq!(rush.observe(queued), None);
            assert!(rush.is_active());
        }
        assert_eq!(rush.observe(7), Some(false));
        assert_eq!(rush.observe(15), None);
        assert!(!rush.is_active());
    }
}
