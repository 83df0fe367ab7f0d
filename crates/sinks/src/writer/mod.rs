//! Rotating writer
//!
//! Appends serialized records to the current target, makes them durable
//! when the sync policy asks, acknowledges each record upstream and rotates
//! to a new target when the rotation policy asks.
//!
//! # Write Path
//!
//! ```text
//! [format] → [lock: append → sync?] → [ack | fail] → [rotate?]
//!                                                       ↓
//!                            [rotation lock: open next → swap → close old]
//!                                                       ↓
//!                                              [actions, in order]
//! ```
//!
//! # Locking
//!
//! One mutex guards a single state value holding the handle, its offset and
//! generation, and both policies. A second mutex serializes rotations and is
//! always taken before the state mutex. Actions run holding only the rotation
//! mutex, so writes into the new target proceed while they run, but the next
//! rotation waits for them.
//!
//! # Outcomes
//!
//! Every record passed to `write` is either acknowledged or failed, exactly
//! once. A rotation failure never changes the outcome of the record that
//! triggered it; it is returned in the receipt for the lifecycle owner.

mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use parking_lot::Mutex;

use crate::ack::Acknowledger;
use crate::action::RotationAction;
use crate::common::{Result, SinkError, WriterMetrics};
use crate::format::RecordFormat;
use crate::fs::{OutputFs, OutputHandle};
use crate::naming::FileNameFormat;
use crate::policy::{RotationPolicy, SyncPolicy};
use crate::record::{Record, RecordId};
use crate::util::LogThrottle;

pub use config::{DEFAULT_WRITER_ID, WriterConfig};

/// The currently open target
struct Target {
    handle: Box<dyn OutputHandle>,
    path: PathBuf,
    generation: u64,
    offset: u64,
}

struct WriterState {
    /// `None` once the writer has been closed
    target: Option<Target>,

    /// Next generation to hand out; consumed even when the open fails
    next_generation: u64,

    sync_policy: Box<dyn SyncPolicy>,
    rotation_policy: Box<dyn RotationPolicy>,

    /// Generation whose policy-triggered rotation has not run yet
    rotation_pending: Option<u64>,
}

/// Why a rotation was requested
#[derive(Debug, Clone, Copy)]
enum Trigger {
    /// Rotation policy fired after a write to this generation
    Policy(u64),
    /// Time-driven poll
    Poll,
    /// Explicit request
    Forced,
}

/// Result of a successful write
#[derive(Debug)]
pub struct WriteReceipt {
    pub record: RecordId,

    /// Generation of the target the record landed in
    pub generation: u64,

    /// Offset of that target right after this record
    pub offset: u64,

    /// Serialized length of the record
    pub bytes: u64,

    /// Whether this write triggered a durable sync
    pub synced: bool,

    /// Rotation triggered by this write, if any
    pub rotation: Option<Result<RotationReport>>,
}

/// Result of a completed rotation
///
/// A rotation that opened its new target is complete even if closing the old
/// target or running actions failed; those failures are listed here.
#[derive(Debug)]
pub struct RotationReport {
    /// Target that was closed
    pub closed_path: PathBuf,
    pub closed_generation: u64,
    pub closed_bytes: u64,

    /// Target now receiving writes
    pub new_path: PathBuf,
    pub new_generation: u64,

    /// `CloseFailed` for the old target
    pub close_error: Option<SinkError>,

    /// `RotationActionFailed` entries, in action order
    pub action_errors: Vec<SinkError>,
}

impl RotationReport {
    /// True when the old target closed and every action succeeded
    pub fn is_clean(&self) -> bool {
        self.close_error.is_none() && self.action_errors.is_empty()
    }

    /// All non-fatal failures of this rotation
    pub fn errors(&self) -> impl Iterator<Item = &SinkError> {
        self.close_error.iter().chain(self.action_errors.iter())
    }
}

/// Durable, rotating writer shared by any number of producer threads
pub struct RotatingWriter {
    id: String,
    fs: Arc<dyn OutputFs>,
    file_name_format: Box<dyn FileNameFormat>,
    record_format: Box<dyn RecordFormat>,
    actions: Vec<Box<dyn RotationAction>>,
    acker: Arc<dyn Acknowledger>,

    /// Held for the whole of a rotation, actions included
    rotation_lock: Mutex<()>,
    state: Mutex<WriterState>,

    metrics: Arc<WriterMetrics>,
    failure_log: LogThrottle,
}

impl RotatingWriter {
    /// Open generation 0 and return a writer ready to accept records
    ///
    /// # Errors
    ///
    /// `SinkError::Open` if the first target cannot be created; the writer
    /// never starts without a target.
    pub fn open(
        fs: Arc<dyn OutputFs>,
        config: WriterConfig,
        acker: Arc<dyn Acknowledger>,
    ) -> Result<Self> {
        let WriterConfig {
            id,
            mut file_name_format,
            record_format,
            sync_policy,
            rotation_policy,
            actions,
        } = config;

        file_name_format.prepare(&id);

        let path = file_name_format.path(0, now_ms());
        let handle = fs.create(&path).map_err(|source| SinkError::Open {
            path: path.clone(),
            source,
        })?;

        tracing::info!(
            writer = %id,
            path = %path.display(),
            generation = 0,
            actions = actions.len(),
            "opened output target"
        );

        Ok(Self {
            id,
            fs,
            file_name_format,
            record_format,
            actions,
            acker,
            rotation_lock: Mutex::new(()),
            state: Mutex::new(WriterState {
                target: Some(Target {
                    handle,
                    path,
                    generation: 0,
                    offset: 0,
                }),
                next_generation: 1,
                sync_policy,
                rotation_policy,
                rotation_pending: None,
            }),
            metrics: Arc::new(WriterMetrics::new()),
            failure_log: LogThrottle::default(),
        })
    }

    /// Write one record
    ///
    /// On `Err` the record has already been reported failed to the
    /// acknowledger; on `Ok` it has been acknowledged.
    pub fn write(&self, record: &Record) -> Result<WriteReceipt> {
        self.metrics.record_received();

        let bytes = self
            .record_format
            .format(record)
            .map_err(|e| self.reject(record, e))?;

        let (generation, offset, synced) = self
            .append(record, &bytes)
            .map_err(|e| self.reject(record, e))?;

        self.acker.ack(record);
        self.metrics.record_acked();

        let rotation = if self.mark_rotation(record, generation) {
            self.run_rotation(Trigger::Policy(generation)).transpose()
        } else {
            None
        };

        Ok(WriteReceipt {
            record: record.id(),
            generation,
            offset,
            bytes: bytes.len() as u64,
            synced,
            rotation,
        })
    }

    /// Rotate now, regardless of the rotation policy
    pub fn rotate(&self) -> Result<RotationReport> {
        self.run_rotation(Trigger::Forced)?.ok_or(SinkError::Closed)
    }

    /// Rotate if the rotation policy's time-driven check says so
    pub fn poll_rotation(&self) -> Result<Option<RotationReport>> {
        self.run_rotation(Trigger::Poll)
    }

    /// Close the current target; later writes fail with `SinkError::Closed`
    ///
    /// Closing an already closed writer is a no-op.
    pub fn close(&self) -> Result<()> {
        let _rotating = self.rotation_lock.lock();
        let Some(target) = self.state.lock().target.take() else {
            return Ok(());
        };
        self.close_target(target)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Bytes written to the current target
    pub fn offset(&self) -> u64 {
        self.state.lock().target.as_ref().map_or(0, |t| t.offset)
    }

    /// Generation of the current target
    pub fn generation(&self) -> Option<u64> {
        self.state.lock().target.as_ref().map(|t| t.generation)
    }

    /// Path of the current target
    pub fn current_path(&self) -> Option<PathBuf> {
        self.state.lock().target.as_ref().map(|t| t.path.clone())
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().target.is_none()
    }

    /// How often `poll_rotation` should be called, if the policy wants it
    pub fn poll_interval(&self) -> Option<Duration> {
        self.state.lock().rotation_policy.poll_interval()
    }

    pub fn metrics(&self) -> &WriterMetrics {
        &self.metrics
    }

    /// Shared handle to the metrics, valid after the writer is dropped
    pub fn metrics_arc(&self) -> Arc<WriterMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Append and, if asked, sync; returns (generation, offset, synced)
    fn append(&self, record: &Record, bytes: &Bytes) -> Result<(u64, u64, bool)> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let target = state.target.as_mut().ok_or(SinkError::Closed)?;

        target
            .handle
            .append(bytes)
            .map_err(|source| SinkError::WriteFailed {
                path: target.path.clone(),
                source,
            })?;
        target.offset += bytes.len() as u64;
        self.metrics.bytes_appended(bytes.len() as u64);

        let mut synced = false;
        if state.sync_policy.mark(record, target.offset) {
            target
                .handle
                .sync_durable()
                .map_err(|source| SinkError::WriteFailed {
                    path: target.path.clone(),
                    source,
                })?;
            state.sync_policy.reset();
            self.metrics.sync();
            synced = true;
        }

        Ok((target.generation, target.offset, synced))
    }

    /// Report a record failure upstream and pass the error through
    fn reject(&self, record: &Record, err: SinkError) -> SinkError {
        self.acker.fail(record);
        self.metrics.record_failed();

        if let Some(suppressed) = self.failure_log.permit() {
            tracing::warn!(
                writer = %self.id,
                record = %record.id(),
                error = %err,
                suppressed,
                "record write failed"
            );
        }
        err
    }

    /// Under the state lock, decide whether a policy-triggered rotation should run
    fn mark_rotation(&self, record: &Record, generation: u64) -> bool {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        if state.rotation_pending.is_some() {
            return false;
        }
        let Some(target) = state.target.as_ref() else {
            return false;
        };
        // Already rotated away: this record's bytes live in a closed target
        if target.generation != generation {
            return false;
        }
        if !state.rotation_policy.mark(record, target.offset) {
            return false;
        }

        state.rotation_pending = Some(generation);
        true
    }

    /// Run a rotation; `Ok(None)` means it was not needed after all
    fn run_rotation(&self, trigger: Trigger) -> Result<Option<RotationReport>> {
        let _rotating = self.rotation_lock.lock();

        let (old, new_path, new_generation) = {
            let mut guard = self.state.lock();
            let state = &mut *guard;

            let proceed = match trigger {
                Trigger::Policy(generation) => state.rotation_pending == Some(generation),
                Trigger::Poll => state.target.is_some() && state.rotation_policy.poll(),
                Trigger::Forced => {
                    if state.target.is_none() {
                        return Err(SinkError::Closed);
                    }
                    true
                }
            };
            if !proceed {
                return Ok(None);
            }
            let Some(current) = state.target.as_mut() else {
                state.rotation_pending = None;
                return Ok(None);
            };

            let generation = state.next_generation;
            state.next_generation += 1;

            let path = self.file_name_format.path(generation, now_ms());
            let handle = match self.fs.create(&path) {
                Ok(handle) => handle,
                Err(source) => {
                    state.rotation_pending = None;
                    self.metrics.rotation_failure();
                    tracing::error!(
                        writer = %self.id,
                        path = %path.display(),
                        generation,
                        error = %source,
                        "failed to open next target, keeping current"
                    );
                    return Err(SinkError::RotationFailed { path, source });
                }
            };

            let old = std::mem::replace(
                current,
                Target {
                    handle,
                    path: path.clone(),
                    generation,
                    offset: 0,
                },
            );
            state.rotation_policy.reset();
            state.rotation_pending = None;

            (old, path, generation)
        };

        let closed_path = old.path.clone();
        let closed_generation = old.generation;
        let closed_bytes = old.offset;

        let close_error = self.close_target(old).err();
        let action_errors = self.run_actions(&closed_path);

        self.metrics.rotation();
        tracing::info!(
            writer = %self.id,
            closed = %closed_path.display(),
            opened = %new_path.display(),
            generation = new_generation,
            bytes = closed_bytes,
            "rotated output target"
        );

        Ok(Some(RotationReport {
            closed_path,
            closed_generation,
            closed_bytes,
            new_path,
            new_generation,
            close_error,
            action_errors,
        }))
    }

    fn close_target(&self, target: Target) -> Result<()> {
        let Target { handle, path, .. } = target;

        match handle.close() {
            Ok(()) => {
                tracing::debug!(writer = %self.id, path = %path.display(), "closed target");
                Ok(())
            }
            Err(source) => {
                self.metrics.close_failure();
                tracing::error!(
                    writer = %self.id,
                    path = %path.display(),
                    error = %source,
                    "failed to close target"
                );
                Err(SinkError::CloseFailed { path, source })
            }
        }
    }

    /// Run every action once, in order, collecting failures
    fn run_actions(&self, closed: &Path) -> Vec<SinkError> {
        let mut failures = Vec::new();

        for action in &self.actions {
            if let Err(source) = action.execute(self.fs.as_ref(), closed) {
                self.metrics.action_failure();
                tracing::error!(
                    writer = %self.id,
                    action = action.name(),
                    path = %closed.display(),
                    error = %source,
                    "rotation action failed"
                );
                failures.push(SinkError::RotationActionFailed {
                    action: action.name().to_string(),
                    path: closed.to_path_buf(),
                    source,
                });
            }
        }

        failures
    }
}

impl Drop for RotatingWriter {
    fn drop(&mut self) {
        if let Some(target) = self.state.get_mut().target.take() {
            // close_target logs the failure
            let _ = self.close_target(target);
        }
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
#[path = "writer_test.rs"]
mod writer_test;
