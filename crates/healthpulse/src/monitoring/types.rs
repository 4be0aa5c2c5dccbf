use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a single probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Healthy,
    Warning,
    Error,
    Unknown,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Healthy => write!(f, "healthy"),
            Status::Warning => write!(f, "warning"),
            Status::Error => write!(f, "error"),
            Status::Unknown => write!(f, "unknown"),
        }
    }
}

/// One recorded probe outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Milliseconds since the poller was created, taken from the monotonic
    /// clock when the probe completed
    pub timestamp_ms: u64,

    /// Wall-clock time the sample was recorded
    pub recorded_at: DateTime<Utc>,

    /// Round-trip time in milliseconds
    pub response_time_ms: u64,

    /// Classified status (only healthy/error are produced at sample time)
    pub status: Status,

    /// HTTP status code, absent on transport failure
    pub status_code: Option<u16>,

    /// Uptime reported by the endpoint
    pub uptime_ms: u64,

    /// Request counter reported by the endpoint
    pub total_requests: u64,

    /// Error counter reported by the endpoint, bumped locally on transport failure
    pub error_count: u64,
}

impl Sample {
    /// Create a sample with zeroed counters
    pub fn new(timestamp_ms: u64, response_time_ms: u64, status: Status) -> Self {
        Self {
            timestamp_ms,
            recorded_at: Utc::now(),
            response_time_ms,
            status,
            status_code: None,
            uptime_ms: 0,
            total_requests: 0,
            error_count: 0,
        }
    }

    /// Attach endpoint counters
    pub fn with_counters(mut self, uptime_ms: u64, total_requests: u64, error_count: u64) -> Self {
        self.uptime_ms = uptime_ms;
        self.total_requests = total_requests;
        self.error_count = error_count;
        self
    }

    /// Attach the HTTP status code
    pub fn with_status_code(mut self, status_code: Option<u16>) -> Self {
        self.status_code = status_code;
        self
    }

    /// Presentation tier for this sample at the given latency threshold
    pub fn tier(&self, warning_threshold_ms: u64) -> DisplayTier {
        DisplayTier::of(self, warning_threshold_ms)
    }
}

/// Presentation tier derived from a sample.
///
/// Warning is never stored: it is computed from latency at display time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayTier {
    Healthy,
    Warning,
    Error,
    Unknown,
}

impl DisplayTier {
    pub fn of(sample: &Sample, warning_threshold_ms: u64) -> Self {
        match sample.status {
            Status::Error => DisplayTier::Error,
            Status::Warning => DisplayTier::Warning,
            Status::Healthy if sample.response_time_ms > warning_threshold_ms => DisplayTier::Warning,
            Status::Healthy => DisplayTier::Healthy,
            Status::Unknown => DisplayTier::Unknown,
        }
    }
}

impl std::fmt::Display for DisplayTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayTier::Healthy => write!(f, "healthy"),
            DisplayTier::Warning => write!(f, "warning"),
            DisplayTier::Error => write!(f, "error"),
            DisplayTier::Unknown => write!(f, "unknown"),
        }
    }
}

/// Read-only view handed to consumers
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub last_sample: Option<Sample>,
    pub average_response_time: u64,
    pub success_rate: u8,
    pub history_size: usize,
    pub running: bool,
    pub interval_ms: u64,
    pub target: String,
}
