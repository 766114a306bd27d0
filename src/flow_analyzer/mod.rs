pub mod metrics;
pub mod predictive_model;

// Re-export the items from metrics and predictive_model
pub use metrics::{compute_efficiency, compute_throughput, PerformanceHistory, RushHourDetector};
pub use predictive_model::{predict_congestion, CongestionForecast};
