use std::time::{Duration, Instant};

use crate::record::Record;

/// Decides when the current target must be made durable
pub trait SyncPolicy: Send {
    /// Observe a successful append; `offset` is the target's new length
    fn mark(&mut self, record: &Record, offset: u64) -> bool;

    /// Forget progress after a successful durable sync
    fn reset(&mut self);
}

/// Syncs after every `count` records
#[derive(Debug, Clone)]
pub struct CountSyncPolicy {
    count: u64,
    executed: u64,
}

impl CountSyncPolicy {
    /// `count` of zero is treated as one (sync every record)
    pub fn new(count: u64) -> Self {
        Self {
            count: count.max(1),
            executed: 0,
        }
    }
}

impl SyncPolicy for CountSyncPolicy {
    fn mark(&mut self, _record: &Record, _offset: u64) -> bool {
        self.executed += 1;
        self.executed >= self.count
    }

    fn reset(&mut self) {
        self.executed = 0;
    }
}

/// Syncs on the first write after `interval` has elapsed since the last sync
#[derive(Debug, Clone)]
pub struct TimedSyncPolicy {
    interval: Duration,
    since: Instant,
}

impl TimedSyncPolicy {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            since: Instant::now(),
        }
    }
}

impl SyncPolicy for TimedSyncPolicy {
    fn mark(&mut self, _record: &Record, _offset: u64) -> bool {
        self.since.elapsed() >= self.interval
    }

    fn reset(&mut self) {
        self.since = Instant::now();
    }
}
