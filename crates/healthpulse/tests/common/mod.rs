//! Shared test doubles

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use healthpulse::{HealthPayload, Outcome, Prober, ProbeError};

/// One scripted probe: how long it takes and what it returns
#[derive(Debug, Clone)]
pub struct Step {
    pub delay: Duration,
    pub outcome: Outcome,
}

pub fn healthy(delay_ms: u64, payload: Option<HealthPayload>) -> Step {
    Step {
        delay: Duration::from_millis(delay_ms),
        outcome: Outcome::Ok { http_ok: true, status_code: 200, elapsed_ms: delay_ms, payload },
    }
}

pub fn refused(delay_ms: u64) -> Step {
    Step {
        delay: Duration::from_millis(delay_ms),
        outcome: Outcome::Fail {
            elapsed_ms: delay_ms,
            reason: ProbeError::Transport("connection refused".to_string()),
        },
    }
}

pub fn counters(uptime: u64, total: u64, errors: u64) -> Option<HealthPayload> {
    Some(HealthPayload {
        uptime_ms: Some(uptime),
        total_requests: Some(total),
        error_count: Some(errors),
    })
}

/// Prober that replays a script, then repeats a fallback step forever
pub struct ScriptedProber {
    script: Mutex<VecDeque<Step>>,
    fallback: Step,
    calls: AtomicUsize,
    targets: Mutex<Vec<String>>,
}

impl ScriptedProber {
    pub fn always(step: Step) -> Arc<Self> {
        Self::with_script(Vec::new(), step)
    }

    pub fn with_script(script: Vec<Step>, fallback: Step) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: AtomicUsize::new(0),
            targets: Mutex::new(Vec::new()),
        })
    }

    /// Number of probes dispatched so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Targets probed, in dispatch order
    pub fn targets(&self) -> Vec<String> {
        self.targets.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, target: &str) -> Outcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.targets.lock().unwrap().push(target.to_string());

        let step = self.script.lock().unwrap().pop_front().unwrap_or_else(|| self.fallback.clone());
        tokio::time::sleep(step.delay).await;
        step.outcome
    }
}
