//! Local disk store
//!
//! Appends go through a `BufWriter`; a durable sync flushes the buffer and
//! then `fsync`s the file so both data and length survive a crash.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::{OutputFs, OutputHandle};

/// Default write buffer size (64KB)
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Local filesystem capability
#[derive(Debug, Clone)]
pub struct LocalFs {
    buffer_size: usize,
}

impl LocalFs {
    /// Create a local store with the given write buffer size
    pub fn new(buffer_size: usize) -> Self {
        Self { buffer_size }
    }

    /// Create a local store that writes straight through to the file
    pub fn unbuffered() -> Self {
        Self::new(0)
    }
}

impl Default for LocalFs {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_SIZE)
    }
}

impl OutputFs for LocalFs {
    fn create(&self, path: &Path) -> io::Result<Box<dyn OutputHandle>> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let file = File::options().create(true).append(true).open(path)?;

        tracing::debug!(path = %path.display(), "opened local target");

        Ok(Box::new(LocalHandle {
            writer: BufWriter::with_capacity(self.buffer_size, file),
            path: path.to_path_buf(),
        }))
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn create_dir_all(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)
    }
}

struct LocalHandle {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl OutputHandle for LocalHandle {
    fn append(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes)
    }

    fn sync_durable(&mut self) -> io::Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()
    }

    fn close(mut self: Box<Self>) -> io::Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        tracing::debug!(path = %self.path.display(), "closed local target");
        Ok(())
    }
}

#[cfg(test)]
#[path = "local_test.rs"]
mod local_test;
