use std::time::{Duration, Instant};

use crate::record::Record;

/// Decides when the current target is closed and the next one opened
pub trait RotationPolicy: Send {
    /// Observe an acknowledged write; `offset` is the target's length
    fn mark(&mut self, record: &Record, offset: u64) -> bool;

    /// Forget progress after a successful rotation
    fn reset(&mut self);

    /// Time-driven check with no triggering record
    ///
    /// Lets idle targets rotate on schedule. Defaults to never.
    fn poll(&mut self) -> bool {
        false
    }

    /// How often `poll` is worth calling, if at all
    fn poll_interval(&self) -> Option<Duration> {
        None
    }
}

/// Binary size units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    Kb,
    Mb,
    Gb,
    Tb,
}

impl SizeUnit {
    pub const fn bytes(self) -> u64 {
        match self {
            SizeUnit::Kb => 1 << 10,
            SizeUnit::Mb => 1 << 20,
            SizeUnit::Gb => 1 << 30,
            SizeUnit::Tb => 1 << 40,
        }
    }
}

/// Rotates once the target holds at least `max_bytes`
#[derive(Debug, Clone)]
pub struct FileSizeRotationPolicy {
    max_bytes: u64,
    last_offset: u64,
    written: u64,
}

impl FileSizeRotationPolicy {
    /// Limit expressed as `size` of `unit`, e.g. `(1.5, SizeUnit::Mb)`
    pub fn new(size: f64, unit: SizeUnit) -> Self {
        Self::from_bytes((size * unit.bytes() as f64) as u64)
    }

    pub fn from_bytes(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            last_offset: 0,
            written: 0,
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }
}

impl RotationPolicy for FileSizeRotationPolicy {
    fn mark(&mut self, _record: &Record, offset: u64) -> bool {
        self.written += offset.saturating_sub(self.last_offset);
        self.last_offset = offset;
        self.written >= self.max_bytes
    }

    fn reset(&mut self) {
        self.written = 0;
        self.last_offset = 0;
    }
}

/// Rotates after every `count` records
#[derive(Debug, Clone)]
pub struct CountRotationPolicy {
    count: u64,
    seen: u64,
}

impl CountRotationPolicy {
    /// `count` of zero is treated as one
    pub fn new(count: u64) -> Self {
        Self {
            count: count.max(1),
            seen: 0,
        }
    }
}

impl RotationPolicy for CountRotationPolicy {
    fn mark(&mut self, _record: &Record, _offset: u64) -> bool {
        self.seen += 1;
        self.seen >= self.count
    }

    fn reset(&mut self) {
        self.seen = 0;
    }
}

/// Rotates every `interval`, whether or not records arrive
#[derive(Debug, Clone)]
pub struct TimedRotationPolicy {
    interval: Duration,
    since: Instant,
}

impl TimedRotationPolicy {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            since: Instant::now(),
        }
    }

    fn due(&self) -> bool {
        self.since.elapsed() >= self.interval
    }
}

impl RotationPolicy for TimedRotationPolicy {
    fn mark(&mut self, _record: &Record, _offset: u64) -> bool {
        self.due()
    }

    fn reset(&mut self) {
        self.since = Instant::now();
    }

    fn poll(&mut self) -> bool {
        self.due()
    }

    fn poll_interval(&self) -> Option<Duration> {
        Some(self.interval)
    }
}
