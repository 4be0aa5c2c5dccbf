//! Input validation for the poller's control operations.

use url::Url;

use crate::error::PollerError;

/// Validate a probe target and return it in normalised form
pub fn validate_target(target: &str) -> Result<String, PollerError> {
    let url = Url::parse(target.trim())
        .map_err(|e| PollerError::InvalidTarget(format!("{}: {}", target, e)))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(PollerError::InvalidTarget(format!("unsupported scheme: {}", other)));
        }
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(PollerError::InvalidTarget(format!("missing host: {}", target)));
    }

    if url.port() == Some(0) {
        return Err(PollerError::InvalidTarget("port 0 is not valid".to_string()));
    }

    Ok(url.to_string())
}

/// Validate a polling interval in milliseconds
pub fn validate_interval(interval_ms: u64) -> Result<u64, PollerError> {
    if interval_ms == 0 {
        return Err(PollerError::InvalidInterval(interval_ms));
    }

    if interval_ms < 500 {
        tracing::warn!("polling every {} ms - ensure the target can take this load", interval_ms);
    }

    Ok(interval_ms)
}

/// Validate a per-request timeout in milliseconds
pub fn validate_timeout(timeout_ms: u64) -> Result<u64, PollerError> {
    if timeout_ms == 0 {
        return Err(PollerError::InvalidTimeout(timeout_ms));
    }

    Ok(timeout_ms)
}
