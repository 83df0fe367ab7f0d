//! In-memory store with fault injection
//!
//! Tracks, per path, every appended byte and how many of them have been made
//! durable, so tests can tell "appended" apart from "synced". Each
//! `fail_next_*` call arms exactly one failure of that primitive.
//!
//! A failed close leaves the target open, the same way a real store may leak
//! the resource.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{OutputFs, OutputHandle};

#[derive(Debug, Default)]
struct MemFile {
    data: Vec<u8>,
    durable_len: usize,
    open: bool,
}

#[derive(Debug, Default)]
struct Faults {
    create: usize,
    append: usize,
    sync: usize,
    close: usize,
    rename: usize,
}

impl Faults {
    fn take(counter: &mut usize, op: &str) -> io::Result<()> {
        if *counter > 0 {
            *counter -= 1;
            return Err(io::Error::other(format!("injected {op} failure")));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Inner {
    files: BTreeMap<PathBuf, MemFile>,
    faults: Faults,
}

/// In-memory filesystem capability
///
/// Cloning shares the same underlying store.
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `create`
    pub fn fail_next_create(&self) {
        self.inner.lock().faults.create += 1;
    }

    /// Fail the next `append` on any handle
    pub fn fail_next_append(&self) {
        self.inner.lock().faults.append += 1;
    }

    /// Fail the next `sync_durable` on any handle
    pub fn fail_next_sync(&self) {
        self.inner.lock().faults.sync += 1;
    }

    /// Fail the next `close` on any handle
    pub fn fail_next_close(&self) {
        self.inner.lock().faults.close += 1;
    }

    /// Fail the next `rename`
    pub fn fail_next_rename(&self) {
        self.inner.lock().faults.rename += 1;
    }

    /// All bytes appended to `path`
    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.inner.lock().files.get(path).map(|f| f.data.clone())
    }

    /// Bytes of `path` covered by the last durable sync or close
    pub fn durable_len(&self, path: &Path) -> Option<usize> {
        self.inner.lock().files.get(path).map(|f| f.durable_len)
    }

    /// Whether `path` still has an open handle
    pub fn is_open(&self, path: &Path) -> bool {
        self.inner.lock().files.get(path).is_some_and(|f| f.open)
    }

    /// Number of targets with an open handle
    pub fn open_count(&self) -> usize {
        self.inner.lock().files.values().filter(|f| f.open).count()
    }

    /// All known paths, sorted
    pub fn paths(&self) -> Vec<PathBuf> {
        self.inner.lock().files.keys().cloned().collect()
    }
}

impl OutputFs for MemoryFs {
    fn create(&self, path: &Path) -> io::Result<Box<dyn OutputHandle>> {
        let mut inner = self.inner.lock();
        Faults::take(&mut inner.faults.create, "create")?;

        let file = inner.files.entry(path.to_path_buf()).or_default();
        if file.open {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} is already open", path.display()),
            ));
        }
        file.open = true;

        Ok(Box::new(MemoryHandle {
            inner: Arc::clone(&self.inner),
            path: path.to_path_buf(),
        }))
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut inner = self.inner.lock();
        Faults::take(&mut inner.faults.rename, "rename")?;

        if inner.files.contains_key(to) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} exists", to.display()),
            ));
        }
        let file = inner.files.remove(from).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{} not found", from.display()))
        })?;
        inner.files.insert(to.to_path_buf(), file);
        Ok(())
    }

    fn create_dir_all(&self, _dir: &Path) -> io::Result<()> {
        Ok(())
    }
}

struct MemoryHandle {
    inner: Arc<Mutex<Inner>>,
    path: PathBuf,
}

impl MemoryHandle {
    fn with_file<T>(
        &self,
        op: &str,
        fault: impl FnOnce(&mut Faults) -> &mut usize,
        f: impl FnOnce(&mut MemFile) -> T,
    ) -> io::Result<T> {
        let mut inner = self.inner.lock();
        Faults::take(fault(&mut inner.faults), op)?;
        let file = inner
            .files
            .get_mut(&self.path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "target was moved"))?;
        Ok(f(file))
    }
}

impl OutputHandle for MemoryHandle {
    fn append(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.with_file("append", |f| &mut f.append, |file| {
            file.data.extend_from_slice(bytes);
        })
    }

    fn sync_durable(&mut self) -> io::Result<()> {
        self.with_file("sync", |f| &mut f.sync, |file| {
            file.durable_len = file.data.len();
        })
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        self.with_file("close", |f| &mut f.close, |file| {
            file.durable_len = file.data.len();
            file.open = false;
        })
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;
