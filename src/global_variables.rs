// Signal timings (milliseconds)
pub const YELLOW_DURATION_MS: u64 = 1_500;
pub const ALL_RED_BUFFER_MS: u64 = 600;
pub const CYCLE_SETTLE_MS: u64 = 1_500;
pub const STEP_PACING_MS: u64 = 800;

// Vehicle flow
pub const DRAIN_SPACING_MS: u64 = 200;
pub const MIN_DRAIN_BATCH: usize = 3;
pub const MAX_DRAIN_BATCH: usize = 6;

// Arrival generation
pub const BATCH_PERIOD_MS: u64 = 2_500;
pub const BATCH_STAGGER_MS: u64 = 300;
pub const MAX_ARRIVAL_DELAY_MS: u64 = 1_000;
pub const RUSH_HOUR_BATCH_MULTIPLIER: f64 = 2.5;
pub const INITIAL_TRAFFIC_COUNT: usize = 12;
pub const INITIAL_TRAFFIC_DELAY_MS: u64 = 1_000;
pub const INITIAL_TRAFFIC_SPACING_MS: u64 = 400;
pub const RESET_STANDBY_DELAY_MS: u64 = 2_000;

// Emergency preemption
pub const EMERGENCY_ALL_RED_MS: u64 = 1_000;
pub const EMERGENCY_GREEN_LEAD_MS: u64 = 500;
pub const EMERGENCY_TIMEOUT_MS: u64 = 8_000;

// Metrics
pub const HISTORY_CAPACITY: usize = 50;
pub const RUSH_HOUR_ON_ABOVE: usize = 20;
pub const RUSH_HOUR_OFF_BELOW: usize = 8;
pub const CONGESTION_QUEUE_THRESHOLD: usize = 5;
pub const MIN_EFFICIENCY: f64 = 15.0;
pub const MAX_EFFICIENCY: f64 = 100.0;

// Event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 4_096;
