//! Rolling statistics over the history window.
//!
//! Everything here is recomputed from the store on every read; nothing is
//! cached between calls.

use serde::Serialize;

use super::history::HistoryStore;
use super::types::Status;

/// Mean round-trip time in whole milliseconds (half rounds up), 0 when empty
pub fn average_response_time(history: &HistoryStore) -> u64 {
    let n = history.len() as u64;
    if n == 0 {
        return 0;
    }
    let sum: u64 = history.iter().map(|s| s.response_time_ms).sum();
    rounded_div(sum, n)
}

/// Percentage of healthy samples, rounded to the nearest integer, 0 when empty
pub fn success_rate(history: &HistoryStore) -> u8 {
    let n = history.len() as u64;
    if n == 0 {
        return 0;
    }
    let healthy = history.iter().filter(|s| s.status == Status::Healthy).count() as u64;
    // healthy <= n, so the result is at most 100
    rounded_div(healthy * 100, n) as u8
}

/// Extended statistics for the current window
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub count: usize,
    pub healthy: usize,
    pub errors: usize,
    pub success_rate: u8,
    pub avg_latency: u64,
    pub min_latency: u64,
    pub max_latency: u64,
    pub p95_latency: u64,
}

/// Compute count, success and latency distribution in one pass over a sorted copy
pub fn summarize(history: &HistoryStore) -> Stats {
    if history.is_empty() {
        return Stats::default();
    }

    let healthy = history.iter().filter(|s| s.status == Status::Healthy).count();
    let errors = history.iter().filter(|s| s.status == Status::Error).count();

    let mut latencies: Vec<u64> = history.iter().map(|s| s.response_time_ms).collect();
    latencies.sort_unstable();

    let len = latencies.len();
    let p95_idx = (len * 95).div_ceil(100);

    Stats {
        count: len,
        healthy,
        errors,
        success_rate: success_rate(history),
        avg_latency: average_response_time(history),
        min_latency: latencies[0],
        max_latency: latencies[len - 1],
        p95_latency: latencies[p95_idx.min(len - 1)],
    }
}

fn rounded_div(numerator: u64, denominator: u64) -> u64 {
    (2 * numerator + denominator) / (2 * denominator)
}
