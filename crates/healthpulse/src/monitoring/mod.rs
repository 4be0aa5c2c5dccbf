//! Monitoring engine module - the single-endpoint probe cycle
//!
//! This module is responsible for:
//! - Probing the target endpoint over HTTP
//! - Classifying each outcome into a status
//! - Retaining a bounded history of samples
//! - Deriving rolling statistics from that history
//! - Scheduling repeated probes

pub mod aggregator;
pub mod classifier;
pub mod history;
pub mod prober;
pub mod scheduler;
pub mod types;
pub mod validation;

pub use aggregator::Stats;
pub use classifier::classify;
pub use history::HistoryStore;
pub use prober::{HealthPayload, HttpProber, Outcome, Prober};
pub use scheduler::Poller;
pub use types::{DisplayTier, Sample, Snapshot, Status};
