use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Counters reported by the health endpoint
pub struct ServerState {
    started: Instant,
    total_requests: AtomicU64,
    error_count: AtomicU64,
}

impl ServerState {
    pub fn new() -> Self {
        Self { started: Instant::now(), total_requests: AtomicU64::new(0), error_count: AtomicU64::new(0) }
    }

    pub fn uptime_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Count a served request and return the new total
    pub fn record_request(&self) -> u64 {
        self.total_requests.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_error(&self) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn error_count(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}
