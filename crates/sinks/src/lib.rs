//! Roller - Sinks
//!
//! Rotating, durable output writer for record pipelines.
//!
//! # Architecture
//!
//! A `RotatingWriter` appends serialized records to the current output
//! target, makes them durable according to a sync policy, acknowledges each
//! record back to the host and closes the target for a fresh one according to
//! a rotation policy. Closed targets are handed to rotation actions.
//!
//! ```text
//! [Host] --Record--> [RotatingWriter] --bytes--> [OutputHandle]
//!    ↑                     │    ↓ (rotation)
//!    └──── ack / fail ─────┘  [RotationAction, ...]
//! ```
//!
//! # Building Blocks
//!
//! | Concern | Trait | Provided |
//! |---------|-------|----------|
//! | Storage | `OutputFs` | `LocalFs`, `MemoryFs` |
//! | Serialization | `RecordFormat` | `DelimitedRecordFormat` |
//! | File naming | `FileNameFormat` | `DefaultFileNameFormat`, `TimeBucketFileNameFormat` |
//! | Durability | `SyncPolicy` | `CountSyncPolicy`, `TimedSyncPolicy` |
//! | Rotation | `RotationPolicy` | `FileSizeRotationPolicy`, `CountRotationPolicy`, `TimedRotationPolicy` |
//! | Post-rotation | `RotationAction` | `MoveFileAction`, `FnAction` |
//! | Upstream | `Acknowledger` | `ChannelAcknowledger`, `NoopAcknowledger` |
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use roller_sinks::{
//!     CountSyncPolicy, DefaultFileNameFormat, DelimitedRecordFormat, FileSizeRotationPolicy,
//!     LocalFs, NoopAcknowledger, RotatingWriter, SizeUnit, WriterConfig,
//! };
//!
//! let config = WriterConfig::new(
//!     DefaultFileNameFormat::new("out/"),
//!     DelimitedRecordFormat::new(),
//!     CountSyncPolicy::new(1000),
//!     FileSizeRotationPolicy::new(5.0, SizeUnit::Mb),
//! );
//! let writer = RotatingWriter::open(Arc::new(LocalFs::default()), config, Arc::new(NoopAcknowledger))?;
//! writer.write(&record)?;
//! ```

/// Upstream acknowledgment capability
pub mod ack;

/// Hooks run on every closed target
pub mod action;

/// Record serialization
pub mod format;

/// Filesystem capability (local and in-memory)
pub mod fs;

/// Output path naming per generation
pub mod naming;

/// Sync and rotation policies
pub mod policy;

/// Upstream record type
pub mod record;

/// Channel-fed async driver
pub mod rolling;

/// Shared utilities
pub mod util;

/// The rotating writer
pub mod writer;

/// Errors and metrics
mod common;

// =============================================================================
// Public re-exports
// =============================================================================

pub use common::{MetricsSnapshot, Result, SinkError, WriterMetrics};

pub use ack::{AckEvent, Acknowledger, ChannelAcknowledger, NoopAcknowledger};
pub use action::{FnAction, MoveFileAction, RotationAction};
pub use format::{DelimitedRecordFormat, RecordFormat};
pub use fs::{LocalFs, MemoryFs, OutputFs, OutputHandle};
pub use naming::{DefaultFileNameFormat, FileNameFormat, TimeBucket, TimeBucketFileNameFormat};
pub use policy::{
    CountRotationPolicy, CountSyncPolicy, FileSizeRotationPolicy, RotationPolicy, SizeUnit,
    SyncPolicy, TimedRotationPolicy, TimedSyncPolicy,
};
pub use record::{Record, RecordId};
pub use rolling::{RollingSink, RollingSinkMetricsHandle};
pub use writer::{RotatingWriter, RotationReport, WriteReceipt, WriterConfig};
