//! Sink utilities

pub mod log_throttle;

pub use log_throttle::{DEFAULT_THROTTLE_INTERVAL, LogThrottle};
