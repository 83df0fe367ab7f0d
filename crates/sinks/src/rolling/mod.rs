//! Rolling sink - channel-fed driver for a `RotatingWriter`
//!
//! Receives records over a tokio channel and hands each one to the writer.
//! When the rotation policy is time-driven, a ticker task polls the writer so
//! idle targets are still rotated on schedule.
//!
//! ```text
//! [Host] --Record--> [Sink Channel] --> [RollingSink::run] --> [RotatingWriter]
//!                                              ↑
//!                                  [rotation ticker (optional)]
//! ```
//!
//! The writer is blocking by design; the sink calls it directly from its
//! task. When the channel closes the ticker is stopped and the writer is
//! closed.
//!
//! With a rotation failure limit set, the sink gives up on the writer once
//! that many rotations in a row fail to open a new target: the writer is
//! closed, the channel stops accepting records and everything still queued
//! is failed upstream.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;

use crate::common::{MetricsSnapshot, Result, SinkError, WriterMetrics};
use crate::record::Record;
use crate::writer::RotatingWriter;

/// Default capacity of the record channel
pub const DEFAULT_QUEUE_SIZE: usize = 1000;

/// Lower bound for the rotation ticker
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Handle for reading sink metrics
///
/// Holds an Arc to the writer metrics, so it remains valid after `run()`
/// consumes the sink.
#[derive(Debug, Clone)]
pub struct RollingSinkMetricsHandle {
    id: String,
    metrics: Arc<WriterMetrics>,
}

impl RollingSinkMetricsHandle {
    pub fn sink_id(&self) -> &str {
        &self.id
    }

    pub fn sink_type(&self) -> &str {
        "rolling"
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// Counts rotations that failed in a row, shared with the ticker
struct RotationFailures {
    sink: String,
    writer: Arc<RotatingWriter>,
    limit: Option<u32>,
    consecutive: AtomicU32,
}

impl RotationFailures {
    fn observe<T>(&self, outcome: &Result<T>) {
        match outcome {
            Ok(_) => self.consecutive.store(0, Ordering::Relaxed),
            Err(SinkError::RotationFailed { .. }) => {
                let failures = self.consecutive.fetch_add(1, Ordering::Relaxed) + 1;
                let Some(limit) = self.limit else {
                    return;
                };
                if failures >= limit && !self.writer.is_closed() {
                    tracing::error!(
                        sink = %self.sink,
                        failures,
                        "giving up on writer after repeated rotation failures"
                    );
                    if let Err(e) = self.writer.close() {
                        tracing::error!(sink = %self.sink, error = %e, "failed to close writer");
                    }
                }
            }
            Err(_) => {}
        }
    }
}

/// Drives a `RotatingWriter` from a record channel
pub struct RollingSink {
    receiver: mpsc::Receiver<Record>,
    writer: Arc<RotatingWriter>,
    name: String,
    rotation_failure_limit: Option<u32>,
}

impl RollingSink {
    /// Create a sink named after the writer id
    pub fn new(writer: RotatingWriter, receiver: mpsc::Receiver<Record>) -> Self {
        let name = writer.id().to_string();
        Self::with_name(writer, receiver, name)
    }

    pub fn with_name(
        writer: RotatingWriter,
        receiver: mpsc::Receiver<Record>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            receiver,
            writer: Arc::new(writer),
            name: name.into(),
            rotation_failure_limit: None,
        }
    }

    /// Close the writer after `limit` consecutive failed rotations
    pub fn with_rotation_failure_limit(mut self, limit: u32) -> Self {
        self.rotation_failure_limit = Some(limit.max(1));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared writer, for forced rotation from the host
    pub fn writer(&self) -> Arc<RotatingWriter> {
        Arc::clone(&self.writer)
    }

    pub fn metrics_handle(&self) -> RollingSinkMetricsHandle {
        RollingSinkMetricsHandle {
            id: self.name.clone(),
            metrics: self.writer.metrics_arc(),
        }
    }

    /// Run the sink, writing records until the channel closes
    pub async fn run(mut self) -> MetricsSnapshot {
        tracing::info!(sink = %self.name, "rolling sink starting");

        let failures = Arc::new(RotationFailures {
            sink: self.name.clone(),
            writer: Arc::clone(&self.writer),
            limit: self.rotation_failure_limit,
            consecutive: AtomicU32::new(0),
        });

        let ticker = self.writer.poll_interval().map(|every| {
            let writer = Arc::clone(&self.writer);
            let failures = Arc::clone(&failures);
            let every = every.max(MIN_POLL_INTERVAL);
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(every);
                loop {
                    interval.tick().await;
                    if writer.is_closed() {
                        break;
                    }
                    // Failures are logged by the writer
                    let outcome = writer.poll_rotation();
                    if !matches!(outcome, Ok(None)) {
                        failures.observe(&outcome);
                    }
                }
            })
        });

        let mut accepting = true;
        while let Some(record) = self.receiver.recv().await {
            match self.writer.write(&record) {
                Ok(receipt) => {
                    if let Some(rotation) = &receipt.rotation {
                        failures.observe(rotation);
                    }
                }
                Err(SinkError::Closed) if accepting => {
                    tracing::warn!(sink = %self.name, "writer closed, failing queued records");
                    self.receiver.close();
                    accepting = false;
                }
                Err(e) => {
                    tracing::debug!(sink = %self.name, record = %record.id(), error = %e, "record failed");
                }
            }
        }

        if let Some(ticker) = ticker {
            ticker.abort();
        }
        if let Err(e) = self.writer.close() {
            tracing::error!(sink = %self.name, error = %e, "failed to close writer");
        }

        let snapshot = self.writer.metrics().snapshot();
        tracing::info!(
            sink = %self.name,
            records_received = snapshot.records_received,
            records_acked = snapshot.records_acked,
            records_failed = snapshot.records_failed,
            bytes = snapshot.bytes_written,
            rotations = snapshot.rotations,
            "rolling sink shutting down"
        );

        snapshot
    }
}
