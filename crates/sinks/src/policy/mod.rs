//! Sync and rotation policies
//!
//! Both policies are consulted by the writer after every write and carry
//! their own progress since the last time they fired. The writer calls
//! `reset()` exactly once after the triggered sync (or rotation) succeeds;
//! policies never reset themselves.
//!
//! Policies must eventually fire under sustained writes, otherwise data is
//! never made durable (sync) or targets grow without bound (rotation).

mod rotation;
mod sync;

pub use rotation::{
    CountRotationPolicy, FileSizeRotationPolicy, RotationPolicy, SizeUnit, TimedRotationPolicy,
};
pub use sync::{CountSyncPolicy, SyncPolicy, TimedSyncPolicy};
