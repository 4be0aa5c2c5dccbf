use thiserror::Error;

/// Why a probe did not produce a clean result.
///
/// These never escape the prober: transport failures are carried inside
/// [`Outcome::Fail`](crate::Outcome::Fail), protocol and parse problems only
/// degrade an `Ok` outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request timed out after {0} ms")]
    Timeout(u64),
    #[error("endpoint answered with HTTP {0}")]
    Protocol(u16),
    #[error("unparseable health payload: {0}")]
    Parse(String),
}

/// Errors returned by the poller's control operations.
#[derive(Debug, Error)]
pub enum PollerError {
    #[error("polling interval must be a positive number of milliseconds, got {0}")]
    InvalidInterval(u64),
    #[error("probe timeout must be a positive number of milliseconds, got {0}")]
    InvalidTimeout(u64),
    #[error("invalid target: {0}")]
    InvalidTarget(String),
    #[error("poller must be started from within a Tokio runtime")]
    NoRuntime,
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}
