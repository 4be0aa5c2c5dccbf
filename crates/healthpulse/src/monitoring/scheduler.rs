//! Run/stop lifecycle and timing of repeated probes.
//!
//! A [`Poller`] owns at most one background run loop. Each tick dispatches
//! the probe as its own task so a slow endpoint never delays the timer;
//! results are recorded in completion order. Stopping cancels the loop only:
//! probes already in flight still complete and are recorded.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use super::aggregator::{self, Stats};
use super::classifier::classify;
use super::history::HistoryStore;
use super::prober::{HttpProber, Outcome, Prober};
use super::types::{Sample, Snapshot};
use super::validation::{validate_interval, validate_target};
use crate::error::PollerError;
use crate::{Result, DEFAULT_TIMEOUT_MS};

/// Handle to an active run loop
struct RunHandle {
    handle: JoinHandle<()>,
    shutdown_tx: watch::Sender<bool>,
    interval_tx: watch::Sender<Duration>,
}

/// Mutable poller state, only touched under the lock
struct PollerState {
    interval_ms: u64,
    target: String,
    history: HistoryStore,
    last_sample: Option<Sample>,
    run: Option<RunHandle>,
}

struct Shared {
    prober: Arc<dyn Prober>,
    epoch: Instant,
    state: Mutex<PollerState>,
    samples_tx: watch::Sender<Option<Sample>>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, PollerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn probe_cycle(&self) -> Sample {
        let target = self.lock().target.clone();
        let outcome = self.prober.probe(&target).await;
        self.record(&outcome)
    }

    /// Turn an outcome into a sample and append it.
    ///
    /// Counters missing from the payload carry over from the previous sample.
    /// A failed probe, or an error response that reports no `error_count`,
    /// bumps the error counter by one.
    fn record(&self, outcome: &Outcome) -> Sample {
        let status = classify(outcome);

        let mut state = self.lock();

        let (uptime, total, errors) = state
            .last_sample
            .as_ref()
            .map(|s| (s.uptime_ms, s.total_requests, s.error_count))
            .unwrap_or_default();

        let (uptime, total, errors) = match outcome {
            Outcome::Ok { http_ok, payload, .. } => {
                let p = (*payload).unwrap_or_default();
                let errors = match p.error_count {
                    Some(reported) => reported,
                    None if !*http_ok => errors.saturating_add(1),
                    None => errors,
                };
                (p.uptime_ms.unwrap_or(uptime), p.total_requests.unwrap_or(total), errors)
            }
            Outcome::Fail { .. } => (uptime, total, errors.saturating_add(1)),
        };

        // Taken under the lock so history stays ordered by timestamp.
        let timestamp_ms = self.epoch.elapsed().as_millis() as u64;

        let sample = Sample::new(timestamp_ms, outcome.elapsed_ms(), status)
            .with_counters(uptime, total, errors)
            .with_status_code(outcome.status_code());

        state.history.append(sample.clone());
        state.last_sample = Some(sample.clone());
        drop(state);

        debug!(
            status = %sample.status,
            response_time_ms = sample.response_time_ms,
            "sample recorded"
        );
        self.samples_tx.send_replace(Some(sample.clone()));

        sample
    }
}

/// Synthetic health poller for a single endpoint
pub struct Poller {
    shared: Arc<Shared>,
}

impl Poller {
    /// Create an idle poller probing `target` over HTTP every `interval_ms`
    pub fn new(target: &str, interval_ms: u64) -> Result<Self> {
        let prober = HttpProber::new(DEFAULT_TIMEOUT_MS)?;
        Self::with_prober(Arc::new(prober), target, interval_ms)
    }

    /// Create an idle poller with a custom prober
    pub fn with_prober(prober: Arc<dyn Prober>, target: &str, interval_ms: u64) -> Result<Self> {
        let target = validate_target(target)?;
        let interval_ms = validate_interval(interval_ms)?;
        let (samples_tx, _) = watch::channel(None);

        Ok(Self {
            shared: Arc::new(Shared {
                prober,
                epoch: Instant::now(),
                state: Mutex::new(PollerState {
                    interval_ms,
                    target,
                    history: HistoryStore::new(),
                    last_sample: None,
                    run: None,
                }),
                samples_tx,
            }),
        })
    }

    /// Start polling: probe immediately, then every interval.
    ///
    /// Does nothing if already running. Must be called within a Tokio runtime.
    pub fn start(&self) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| PollerError::NoRuntime)?;

        let mut state = self.shared.lock();
        if state.run.is_some() {
            debug!("poller already running");
            return Ok(());
        }

        let period = Duration::from_millis(state.interval_ms);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (interval_tx, interval_rx) = watch::channel(period);

        let handle = runtime.spawn(run_loop(Arc::clone(&self.shared), shutdown_rx, interval_rx));
        state.run = Some(RunHandle { handle, shutdown_tx, interval_tx });

        info!(endpoint = %state.target, interval_ms = state.interval_ms, "poller started");
        Ok(())
    }

    /// Stop scheduling further probes. Idempotent.
    pub fn stop(&self) {
        let run = self.shared.lock().run.take();
        if let Some(run) = run {
            let _ = run.shutdown_tx.send(true);
            run.handle.abort();
            info!("poller stopped");
        }
    }

    /// Change the polling period.
    ///
    /// While running, the pending timer is re-armed so the next tick fires one
    /// new period from now.
    pub fn set_interval(&self, interval_ms: u64) -> Result<()> {
        let interval_ms = validate_interval(interval_ms)?;

        let mut state = self.shared.lock();
        if state.interval_ms == interval_ms {
            return Ok(());
        }
        state.interval_ms = interval_ms;

        if let Some(run) = &state.run {
            run.interval_tx.send_replace(Duration::from_millis(interval_ms));
        }

        info!(interval_ms, "poll interval changed");
        Ok(())
    }

    /// Point the poller at a new endpoint; takes effect on the next tick
    pub fn set_target(&self, target: &str) -> Result<()> {
        let target = validate_target(target)?;
        info!(endpoint = %target, "poll target changed");
        self.shared.lock().target = target;
        Ok(())
    }

    /// Drop all retained samples. The latest sample and run state are kept.
    pub fn clear_history(&self) {
        self.shared.lock().history.clear();
    }

    /// Run one probe cycle right now, outside the schedule
    pub async fn probe_now(&self) -> Sample {
        self.shared.probe_cycle().await
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.shared.lock();
        Snapshot {
            last_sample: state.last_sample.clone(),
            average_response_time: aggregator::average_response_time(&state.history),
            success_rate: aggregator::success_rate(&state.history),
            history_size: state.history.len(),
            running: state.run.is_some(),
            interval_ms: state.interval_ms,
            target: state.target.clone(),
        }
    }

    /// Retained samples, oldest first
    pub fn history(&self) -> Vec<Sample> {
        self.shared.lock().history.to_vec()
    }

    pub fn stats(&self) -> Stats {
        aggregator::summarize(&self.shared.lock().history)
    }

    pub fn last_sample(&self) -> Option<Sample> {
        self.shared.lock().last_sample.clone()
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock().run.is_some()
    }

    pub fn interval_ms(&self) -> u64 {
        self.shared.lock().interval_ms
    }

    pub fn target(&self) -> String {
        self.shared.lock().target.clone()
    }

    /// Watch the most recently recorded sample
    pub fn subscribe(&self) -> watch::Receiver<Option<Sample>> {
        self.shared.samples_tx.subscribe()
    }

    /// Stop and release the poller
    pub fn dispose(self) {
        self.stop();
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

fn ticker(first: Instant, period: Duration) -> Interval {
    let mut ticker = interval_at(first, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// The timer loop for a running poller.
async fn run_loop(
    shared: Arc<Shared>,
    mut shutdown: watch::Receiver<bool>,
    mut interval_rx: watch::Receiver<Duration>,
) {
    let period = *interval_rx.borrow_and_update();
    // First tick completes immediately.
    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = shutdown.changed() => {
                debug!("run loop shutting down");
                break;
            }
            changed = interval_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let period = *interval_rx.borrow_and_update();
                timer = ticker(Instant::now() + period, period);
                debug!(interval_ms = period.as_millis() as u64, "timer re-armed");
            }
            _ = timer.tick() => {
                // stop() may race this arm on another worker; abort() cannot
                // interrupt a poll that is already running.
                if *shutdown.borrow() {
                    debug!("run loop shutting down");
                    break;
                }
                let shared = Arc::clone(&shared);
                tokio::spawn(async move {
                    shared.probe_cycle().await;
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeError;
    use crate::monitoring::prober::HealthPayload;
    use crate::monitoring::types::Status;

    struct FixedProber(Outcome);

    #[derive(Default)]
    struct CountingProber(std::sync::atomic::AtomicUsize);

    #[async_trait::async_trait]
    impl Prober for CountingProber {
        async fn probe(&self, _target: &str) -> Outcome {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            ok(None)
        }
    }

    #[async_trait::async_trait]
    impl Prober for FixedProber {
        async fn probe(&self, _target: &str) -> Outcome {
            self.0.clone()
        }
    }

    fn ok(payload: Option<HealthPayload>) -> Outcome {
        Outcome::Ok { http_ok: true, status_code: 200, elapsed_ms: 40, payload }
    }

    fn poller(outcome: Outcome) -> Poller {
        Poller::with_prober(Arc::new(FixedProber(outcome)), "http://example.com/health", 1000)
            .unwrap()
    }

    #[test]
    fn test_new_poller_is_idle() {
        let poller = poller(ok(None));
        let snapshot = poller.snapshot();

        assert!(!snapshot.running);
        assert_eq!(snapshot.history_size, 0);
        assert_eq!(snapshot.average_response_time, 0);
        assert_eq!(snapshot.success_rate, 0);
        assert!(snapshot.last_sample.is_none());
        assert_eq!(snapshot.target, "http://example.com/health");
    }

    #[test]
    fn test_rejects_bad_configuration() {
        let prober: Arc<dyn Prober> = Arc::new(FixedProber(ok(None)));
        assert!(Poller::with_prober(prober.clone(), "http://example.com", 0).is_err());
        assert!(Poller::with_prober(prober, "example.com", 1000).is_err());

        let poller = poller(ok(None));
        assert!(matches!(poller.set_interval(0), Err(PollerError::InvalidInterval(0))));
        assert!(poller.set_target("gopher://example.com").is_err());
        assert_eq!(poller.interval_ms(), 1000);
    }

    #[test]
    fn test_start_outside_runtime() {
        let poller = poller(ok(None));
        assert!(matches!(poller.start(), Err(PollerError::NoRuntime)));
        assert!(!poller.is_running());
    }

    #[tokio::test]
    async fn test_counters_from_payload() {
        let poller = poller(ok(Some(HealthPayload {
            uptime_ms: Some(60_000),
            total_requests: Some(10),
            error_count: Some(2),
        })));

        let sample = poller.probe_now().await;
        assert_eq!(sample.status, Status::Healthy);
        assert_eq!(sample.response_time_ms, 40);
        assert_eq!(sample.status_code, Some(200));
        assert_eq!((sample.uptime_ms, sample.total_requests, sample.error_count), (60_000, 10, 2));
    }

    #[test]
    fn test_counters_carry_forward() {
        let poller = poller(ok(None));
        let shared = &poller.shared;

        shared.record(&ok(Some(HealthPayload {
            uptime_ms: Some(1000),
            total_requests: Some(5),
            error_count: Some(1),
        })));

        let partial = shared.record(&ok(Some(HealthPayload {
            uptime_ms: Some(2000),
            total_requests: None,
            error_count: None,
        })));
        assert_eq!((partial.uptime_ms, partial.total_requests, partial.error_count), (2000, 5, 1));

        let unparsed = shared.record(&ok(None));
        assert_eq!((unparsed.uptime_ms, unparsed.total_requests, unparsed.error_count), (2000, 5, 1));

        let failed = shared.record(&Outcome::Fail {
            elapsed_ms: 3,
            reason: ProbeError::Transport("connection refused".to_string()),
        });
        assert_eq!(failed.status, Status::Error);
        assert_eq!(failed.status_code, None);
        assert_eq!((failed.uptime_ms, failed.total_requests, failed.error_count), (2000, 5, 2));
    }

    #[test]
    fn test_protocol_error_keeps_reported_counters() {
        let poller = poller(ok(None));
        let sample = poller.shared.record(&Outcome::Ok {
            http_ok: false,
            status_code: 503,
            elapsed_ms: 12,
            payload: Some(HealthPayload { uptime_ms: None, total_requests: Some(7), error_count: Some(3) }),
        });

        assert_eq!(sample.status, Status::Error);
        assert_eq!(sample.status_code, Some(503));
        assert_eq!(sample.error_count, 3);
    }

    #[test]
    fn test_error_response_without_counters_bumps_errors() {
        let poller = poller(ok(None));
        let bad_gateway =
            Outcome::Ok { http_ok: false, status_code: 502, elapsed_ms: 8, payload: None };

        let first = poller.shared.record(&bad_gateway);
        let second = poller.shared.record(&bad_gateway);

        assert_eq!((first.status, first.error_count), (Status::Error, 1));
        assert_eq!((second.status, second.error_count), (Status::Error, 2));

        let partial = poller.shared.record(&Outcome::Ok {
            http_ok: false,
            status_code: 500,
            elapsed_ms: 8,
            payload: Some(HealthPayload { uptime_ms: Some(500), total_requests: None, error_count: None }),
        });
        assert_eq!((partial.uptime_ms, partial.error_count), (500, 3));

        // A healthy answer without counters leaves the error count alone.
        assert_eq!(poller.shared.record(&ok(None)).error_count, 3);
    }

    #[test]
    fn test_clear_history_keeps_last_sample() {
        let poller = poller(ok(None));
        poller.shared.record(&ok(None));
        poller.shared.record(&ok(None));

        poller.clear_history();

        let snapshot = poller.snapshot();
        assert_eq!(snapshot.history_size, 0);
        assert!(snapshot.last_sample.is_some());
        assert!(poller.history().is_empty());
    }

    #[test]
    fn test_subscribe_sees_latest_sample() {
        let poller = poller(ok(None));
        let mut rx = poller.subscribe();
        assert!(rx.borrow_and_update().is_none());

        poller.shared.record(&ok(None));

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_ref().map(|s| s.status), Some(Status::Healthy));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        let poller = poller(ok(None));
        poller.start().unwrap();
        assert!(poller.is_running());

        poller.stop();
        poller.stop();
        assert!(!poller.is_running());

        poller.start().unwrap();
        assert!(poller.is_running());
        poller.dispose();
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_after_shutdown_dispatches_nothing() {
        let prober = Arc::new(CountingProber::default());
        let poller =
            Poller::with_prober(prober.clone(), "http://example.com/health", 1000).unwrap();

        // The flag is already set but no change is pending, as when stop()
        // lands while the loop is inside its tick arm.
        let (_shutdown_tx, shutdown_rx) = watch::channel(true);
        let (_interval_tx, interval_rx) = watch::channel(Duration::from_millis(1000));

        tokio::time::timeout(
            Duration::from_secs(5),
            run_loop(Arc::clone(&poller.shared), shutdown_rx, interval_rx),
        )
        .await
        .expect("run loop should exit on the first tick");

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(prober.0.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert!(poller.history().is_empty());
    }
}
