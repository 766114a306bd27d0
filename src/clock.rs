use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Simulated wall clock for one controller session.
///
/// Backed by Tokio's time driver, so a runtime started with paused time (as the
/// tests do) advances it deterministically instead of waiting on real time.
#[derive(Debug, Clone, Copy)]
pub struct SimClock {
    epoch: Instant,
}

impl SimClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    /// Milliseconds elapsed since this clock was created.
    pub fn now_ms(&self) -> u64 {
        Instant::now().saturating_duration_since(self.epoch).as_millis() as u64
    }

    pub async fn sleep_ms(&self, ms: u64) {
        if ms > 0 {
            sleep(Duration::from_millis(ms)).await;
        }
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn paused_clock_advances_exactly() {
        let clock = SimClock::new();
        assert_eq!(clock.now_ms(), 0);
        clock.sleep_ms(1_500).await;
        assert_eq!(clock.now_ms(), 1_500);
        clock.sleep_ms(0).await;
        assert_eq!(clock.now_ms(), 1_500);
    }
}
