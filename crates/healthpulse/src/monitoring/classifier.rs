use super::prober::Outcome;
use super::types::Status;

/// Map a probe outcome to a status.
///
/// Classification is binary; the latency-based warning tier is derived later
/// by [`DisplayTier`](super::types::DisplayTier).
pub fn classify(outcome: &Outcome) -> Status {
    match outcome {
        Outcome::Ok { http_ok: true, .. } => Status::Healthy,
        Outcome::Ok { http_ok: false, .. } | Outcome::Fail { .. } => Status::Error,
    }
}
