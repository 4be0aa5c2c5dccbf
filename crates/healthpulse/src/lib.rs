//! Healthpulse - synthetic health and latency poller
//!
//! This library periodically probes a single HTTP endpoint, classifies each
//! round trip, keeps a bounded window of recent samples and derives rolling
//! statistics from it on demand.

pub mod error;
pub mod monitoring;

// Re-export main types
pub use error::{PollerError, ProbeError};
pub use monitoring::{
    aggregator, classify, DisplayTier, HealthPayload, HistoryStore, HttpProber, Outcome, Poller,
    Prober, Sample, Snapshot, Stats, Status,
};

/// Healthpulse result type for control operations
pub type Result<T> = std::result::Result<T, PollerError>;

/// Number of samples retained in the history window
pub const MAX_HISTORY: usize = 20;

/// Polling interval used when none is configured
pub const DEFAULT_INTERVAL_MS: u64 = 5000;

/// Interval presets offered to interactive consumers
pub const INTERVAL_CHOICES: [u64; 5] = [1000, 2000, 5000, 10000, 30000];

/// Endpoint polled when none is configured
pub const DEFAULT_TARGET: &str = "http://127.0.0.1:8080/api/v1/health";

/// Latency above which a healthy sample is displayed as a warning
pub const WARNING_LATENCY_MS: u64 = 1000;

/// Per-request transport timeout used by [`HttpProber`] by default
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Largest health response body the prober will read
pub const MAX_BODY_BYTES: usize = 64 * 1024;
