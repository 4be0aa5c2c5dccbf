//! Tracing setup shared by the healthpulse binaries.

mod tracing;

pub use self::tracing::{init, init_with_level};
pub use ::tracing::level_filters::LevelFilter;
