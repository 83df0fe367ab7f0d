//! Common types shared by the writer and the sink task
//!
//! Error taxonomy and lock-free counters.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

/// Result type for writer operations
pub type Result<T> = std::result::Result<T, SinkError>;

/// Errors produced by the rotating writer
///
/// `WriteFailed`, `Serialization` and `Closed` are per-record: the record has
/// already been reported as failed when one of them is returned. The rotation
/// variants are operational and never change a record's outcome.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Initial target could not be opened
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Append or durable flush failed
    #[error("write to {path} failed: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Opening the next target during rotation failed
    #[error("rotation to {path} failed: {source}")]
    RotationFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A post-rotation action failed
    #[error("rotation action '{action}' failed for {path}: {source}")]
    RotationActionFailed {
        action: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Closing the previous target during rotation or shutdown failed
    #[error("failed to close {path}: {source}")]
    CloseFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Record could not be serialized
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Writer has been shut down
    #[error("writer is closed")]
    Closed,

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl SinkError {
    /// Create a serialization error
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error describes a single record's failure
    ///
    /// Per-record errors are resolved by redelivery; everything else belongs
    /// to whoever manages the writer's lifecycle.
    pub fn is_record_failure(&self) -> bool {
        matches!(
            self,
            Self::WriteFailed { .. } | Self::Serialization(_) | Self::Closed
        )
    }
}

/// Counters for a rotating writer
#[derive(Debug, Default)]
pub struct WriterMetrics {
    /// Records passed to `write`
    pub records_received: AtomicU64,

    /// Records acknowledged upstream
    pub records_acked: AtomicU64,

    /// Records reported as failed upstream
    pub records_failed: AtomicU64,

    /// Serialized bytes appended across all targets, including those of
    /// records that later failed to sync
    pub bytes_written: AtomicU64,

    /// Durable flushes performed
    pub syncs: AtomicU64,

    /// Completed rotations
    pub rotations: AtomicU64,

    /// Rotations that could not open a new target
    pub rotation_failures: AtomicU64,

    /// Rotation actions that returned an error
    pub action_failures: AtomicU64,

    /// Targets that failed to close
    pub close_failures: AtomicU64,
}

impl WriterMetrics {
    /// Create new metrics instance
    pub const fn new() -> Self {
        Self {
            records_received: AtomicU64::new(0),
            records_acked: AtomicU64::new(0),
            records_failed: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            syncs: AtomicU64::new(0),
            rotations: AtomicU64::new(0),
            rotation_failures: AtomicU64::new(0),
            action_failures: AtomicU64::new(0),
            close_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_received(&self) {
        self.records_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_acked(&self) {
        self.records_acked.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn bytes_appended(&self, bytes: u64) {
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_failed(&self) {
        self.records_failed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn sync(&self) {
        self.syncs.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn rotation(&self) {
        self.rotations.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn rotation_failure(&self) {
        self.rotation_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn action_failure(&self) {
        self.action_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn close_failure(&self) {
        self.close_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_received: self.records_received.load(Ordering::Relaxed),
            records_acked: self.records_acked.load(Ordering::Relaxed),
            records_failed: self.records_failed.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            syncs: self.syncs.load(Ordering::Relaxed),
            rotations: self.rotations.load(Ordering::Relaxed),
            rotation_failures: self.rotation_failures.load(Ordering::Relaxed),
            action_failures: self.action_failures.load(Ordering::Relaxed),
            close_failures: self.close_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of writer metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub records_received: u64,
    pub records_acked: u64,
    pub records_failed: u64,
    pub bytes_written: u64,
    pub syncs: u64,
    pub rotations: u64,
    pub rotation_failures: u64,
    pub action_failures: u64,
    pub close_failures: u64,
}

#[cfg(test)]
#[path = "common_test.rs"]
mod common_test;
