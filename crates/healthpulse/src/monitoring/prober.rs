use std::time::Duration;

use reqwest::header::ACCEPT;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::validation::validate_timeout;
use crate::error::{PollerError, ProbeError};
use crate::MAX_BODY_BYTES;

/// Counters reported by the target's health payload.
///
/// A field is `None` when it is missing or not a non-negative number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HealthPayload {
    pub uptime_ms: Option<u64>,
    pub total_requests: Option<u64>,
    pub error_count: Option<u64>,
}

impl HealthPayload {
    /// Parse `uptime`, `total_requests` and `error_count` out of a JSON body.
    ///
    /// Any JSON object is accepted; only a body that is not a JSON object at
    /// all is an error.
    pub fn parse(body: &[u8]) -> Result<Self, ProbeError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| ProbeError::Parse(e.to_string()))?;

        let object = value
            .as_object()
            .ok_or_else(|| ProbeError::Parse("expected a JSON object".to_string()))?;

        Ok(Self {
            uptime_ms: object.get("uptime").and_then(non_negative),
            total_requests: object.get("total_requests").and_then(non_negative),
            error_count: object.get("error_count").and_then(non_negative),
        })
    }
}

fn non_negative(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    value
        .as_f64()
        .filter(|f| f.is_finite() && *f >= 0.0 && *f < u64::MAX as f64)
        .map(|f| f.round() as u64)
}

/// Result of a single round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The endpoint answered with a complete HTTP response
    Ok {
        http_ok: bool,
        status_code: u16,
        elapsed_ms: u64,
        payload: Option<HealthPayload>,
    },
    /// No usable response was received
    Fail { elapsed_ms: u64, reason: ProbeError },
}

impl Outcome {
    pub fn elapsed_ms(&self) -> u64 {
        match self {
            Outcome::Ok { elapsed_ms, .. } | Outcome::Fail { elapsed_ms, .. } => *elapsed_ms,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Outcome::Ok { status_code, .. } => Some(*status_code),
            Outcome::Fail { .. } => None,
        }
    }

    pub fn payload(&self) -> Option<&HealthPayload> {
        match self {
            Outcome::Ok { payload, .. } => payload.as_ref(),
            Outcome::Fail { .. } => None,
        }
    }
}

/// Performs one round trip against a target.
///
/// Implementations must not fail: every problem is folded into the returned
/// [`Outcome`], and the elapsed time is recorded either way.
#[async_trait::async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, target: &str) -> Outcome;
}

/// HTTP GET prober backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: reqwest::Client,
    timeout_ms: u64,
}

impl HttpProber {
    pub fn new(timeout_ms: u64) -> Result<Self, PollerError> {
        let timeout_ms = validate_timeout(timeout_ms)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .user_agent(concat!("healthpulse/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PollerError::Client(e.to_string()))?;

        Ok(Self { client, timeout_ms })
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    fn transport_error(&self, error: reqwest::Error) -> ProbeError {
        if error.is_timeout() {
            ProbeError::Timeout(self.timeout_ms)
        } else {
            ProbeError::Transport(error.to_string())
        }
    }
}

/// Read the body chunk by chunk, giving up once it exceeds [`MAX_BODY_BYTES`]
async fn read_capped(mut response: reqwest::Response) -> reqwest::Result<Option<Vec<u8>>> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > MAX_BODY_BYTES {
            return Ok(None);
        }
        body.extend_from_slice(&chunk);
    }
    Ok(Some(body))
}

#[async_trait::async_trait]
impl Prober for HttpProber {
    async fn probe(&self, target: &str) -> Outcome {
        let start = Instant::now();

        let response = match self
            .client
            .get(target)
            .header(ACCEPT, "application/json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let reason = self.transport_error(e);
                let elapsed_ms = start.elapsed().as_millis() as u64;
                warn!(endpoint = %target, elapsed_ms, "probe failed: {}", reason);
                return Outcome::Fail { elapsed_ms, reason };
            }
        };

        let status = response.status();
        let body = read_capped(response).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let body = match body {
            Ok(body) => body,
            Err(e) => {
                let reason = self.transport_error(e);
                warn!(endpoint = %target, elapsed_ms, "probe failed while reading body: {}", reason);
                return Outcome::Fail { elapsed_ms, reason };
            }
        };

        if !status.is_success() {
            warn!(endpoint = %target, elapsed_ms, "{}", ProbeError::Protocol(status.as_u16()));
        }

        let parsed = match body {
            Some(body) => HealthPayload::parse(&body),
            None => Err(ProbeError::Parse(format!("body larger than {} bytes", MAX_BODY_BYTES))),
        };

        let payload = match parsed {
            Ok(payload) => Some(payload),
            Err(e) => {
                debug!(endpoint = %target, "{}", e);
                None
            }
        };

        debug!(endpoint = %target, status = status.as_u16(), elapsed_ms, "probe completed");

        Outcome::Ok { http_ok: status.is_success(), status_code: status.as_u16(), elapsed_ms, payload }
    }
}
