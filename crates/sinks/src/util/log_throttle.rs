//! Throttle for repetitive warnings
//!
//! When the store starts failing every append (disk full, lost lease), each
//! record produces the same warning. `LogThrottle` lets one message through
//! per interval and reports how many were swallowed in between.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Default interval between logged warnings
pub const DEFAULT_THROTTLE_INTERVAL: Duration = Duration::from_secs(10);

pub struct LogThrottle {
    interval: Duration,
    last: Mutex<Option<Instant>>,
    suppressed: AtomicU64,
}

impl LogThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
            suppressed: AtomicU64::new(0),
        }
    }

    /// Returns `Some(suppressed_since_last)` when the caller should log
    pub fn permit(&self) -> Option<u64> {
        let now = Instant::now();
        let mut last = self.last.lock();

        let open = match *last {
            None => true,
            Some(at) => now.duration_since(at) >= self.interval,
        };

        if open {
            *last = Some(now);
            Some(self.suppressed.swap(0, Ordering::Relaxed))
        } else {
            self.suppressed.fetch_add(1, Ordering::Relaxed);
            None
        }
    }
}

impl Default for LogThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE_INTERVAL)
    }
}
