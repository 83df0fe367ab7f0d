//! Filesystem capability
//!
//! The writer only needs four primitives from the store it writes to:
//! create, append, durable sync and close. Rotation actions may additionally
//! rename closed targets and create directories.
//!
//! # Available Implementations
//!
//! - `LocalFs` - buffered local files, durable sync is `fsync`
//! - `MemoryFs` - in-memory store with fault injection
//!
//! # Example
//!
//! ```ignore
//! use roller_sinks::fs::{LocalFs, OutputFs};
//!
//! let fs = LocalFs::default();
//! let mut handle = fs.create("out/part-0.txt".as_ref())?;
//! handle.append(b"hello\n")?;
//! handle.sync_durable()?;
//! handle.close()?;
//! ```

mod local;
mod memory;

use std::io;
use std::path::Path;

pub use local::{DEFAULT_BUFFER_SIZE, LocalFs};
pub use memory::MemoryFs;

/// Store that can create output targets
pub trait OutputFs: Send + Sync {
    /// Create (or open for append) the target at `path`
    ///
    /// Missing parent directories are created.
    fn create(&self, path: &Path) -> io::Result<Box<dyn OutputHandle>>;

    /// Move a closed target
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Create a directory and all of its parents
    fn create_dir_all(&self, dir: &Path) -> io::Result<()>;
}

/// An open, appendable target
///
/// Object-safe so the writer can hold `Box<dyn OutputHandle>`.
pub trait OutputHandle: Send {
    /// Append all of `bytes`
    fn append(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Make every appended byte recoverable after a crash
    ///
    /// Stronger than a buffer flush: returns only once the store reports the
    /// data (and the new length) as persisted.
    fn sync_durable(&mut self) -> io::Result<()>;

    /// Finish the target and release the underlying resource
    fn close(self: Box<Self>) -> io::Result<()>;
}
