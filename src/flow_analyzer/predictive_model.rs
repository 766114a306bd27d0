use serde::{Deserialize, Serialize};
use std::fmt;

use crate::global_variables::CONGESTION_QUEUE_THRESHOLD;
use crate::simulation_engine::vehicles::Direction;

/// Where congestion is expected next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CongestionForecast {
    #[default]
    None,
    Building {
        direction: Direction,
        eta_minutes: u32,
    },
}

impl fmt::Display for CongestionForecast {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CongestionForecast::None => write!(f, "NONE DETECTED"),
            CongestionForecast::Building {
                direction,
                eta_minutes,
            } => write!(f, "{} - {}min", direction, eta_minutes),
        }
    }
}

/// Predict congestion from queue lengths (N, S, E, W order).
///
/// The longest queue is the candidate (earlier direction on ties); it is flagged
/// once it holds more than five vehicles, half a minute per vehicle.
pub fn predict_congestion(queue_lengths: [usize; 4]) -> CongestionForecast {
    let mut longest = (Direction::North, 0usize);
    for direction in Direction::ALL {
        let len = queue_lengths[direction.index()];
        if len > longest.1 {
            longest = (direction, len);
        }
    }

    let (direction, len) = longest;
    if len > CONGESTION_QUEUE_THRESHOLD {
        CongestionForecast::Building {
            direction,
            eta_minutes: (len as f64 * 0.5).floor() as u32,
        }
    } else {
        CongestionForecast::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_queues_predict_nothing() {
        assert_eq!(predict_congestion([5, 5, 0, 2]), CongestionForecast::None);
    }

    #[test]
    fn longest_queue_is_flagged() {
        let forecast = predict_congestion([2, 9, 9, 1]);
        assert_eq!(
            forecast,
            CongestionForecast::Building {
                direction: Direction::South,
                eta_minutes: 4,
            }
        );
        assert_eq!(forecast.to_string(), "SOUTH - 4min");
    }
}
