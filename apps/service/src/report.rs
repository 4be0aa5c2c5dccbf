//! Plain-text and JSON rendering of the poller state.

use std::fmt::Write;

use healthpulse::{DisplayTier, Sample, Snapshot, Stats};
use serde::Serialize;

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Everything a report needs, captured at one instant
#[derive(Debug, Serialize)]
pub struct Report {
    pub snapshot: Snapshot,
    pub stats: Stats,
    #[serde(skip)]
    pub history: Vec<Sample>,
    #[serde(skip)]
    pub warning_threshold_ms: u64,
}

/// Whole minutes, rounded to nearest
pub fn uptime_minutes(uptime_ms: u64) -> u64 {
    uptime_ms.saturating_add(30_000) / 60_000
}

/// One character per sample: `x` for errors, `!` for slow samples, otherwise a
/// bar whose height follows latency (full height at 1000 ms).
pub fn sparkline(history: &[Sample], warning_threshold_ms: u64) -> String {
    history
        .iter()
        .map(|sample| match sample.tier(warning_threshold_ms) {
            DisplayTier::Error => 'x',
            DisplayTier::Warning => '!',
            DisplayTier::Unknown => '?',
            DisplayTier::Healthy => {
                let percent = (sample.response_time_ms / 10).min(100) as usize;
                BARS[(percent * (BARS.len() - 1)) / 100]
            }
        })
        .collect()
}

impl Report {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn render(&self) -> String {
        let snapshot = &self.snapshot;
        let mut out = String::new();

        let state = if snapshot.running { "running" } else { "stopped" };
        let _ = writeln!(
            out,
            "{} [{}, every {} ms]",
            snapshot.target, state, snapshot.interval_ms
        );

        match &snapshot.last_sample {
            Some(sample) => {
                let tier = sample.tier(self.warning_threshold_ms);
                let _ = writeln!(
                    out,
                    "  latency   {} ms (avg {} ms, min {} ms, max {} ms, p95 {} ms)",
                    sample.response_time_ms,
                    snapshot.average_response_time,
                    self.stats.min_latency,
                    self.stats.max_latency,
                    self.stats.p95_latency
                );
                let _ = writeln!(
                    out,
                    "  status    {} (success {}%)",
                    tier.to_string().to_uppercase(),
                    snapshot.success_rate
                );
                let _ = writeln!(out, "  requests  {}", sample.total_requests);
                let _ = writeln!(out, "  errors    {}", sample.error_count);
                let _ = writeln!(out, "  uptime    {}m", uptime_minutes(sample.uptime_ms));
            }
            None => {
                let _ = writeln!(out, "  no samples yet");
            }
        }

        let _ = writeln!(
            out,
            "  history   {} checks {}",
            snapshot.history_size,
            sparkline(&self.history, self.warning_threshold_ms)
        );

        out
    }
}
