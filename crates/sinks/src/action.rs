//! Post-rotation actions
//!
//! Actions run after a target has been closed and the writer has already
//! switched to the next one. They receive the closed path and the store it
//! lives on. An action failing never undoes the rotation; the writer records
//! the failure and carries on with the next action.

use std::io;
use std::path::{Path, PathBuf};

use crate::fs::OutputFs;

/// Hook invoked with the path of each closed target
pub trait RotationAction: Send + Sync {
    /// Short name used in reports and logs
    fn name(&self) -> &str;

    /// Act on the closed target
    fn execute(&self, fs: &dyn OutputFs, closed: &Path) -> io::Result<()>;
}

/// Moves closed targets into a destination directory
///
/// Downstream consumers can then treat the destination as "finalized files
/// only".
#[derive(Debug, Clone)]
pub struct MoveFileAction {
    dest: PathBuf,
}

impl MoveFileAction {
    pub fn new(dest: impl Into<PathBuf>) -> Self {
        Self { dest: dest.into() }
    }

    pub fn dest(&self) -> &Path {
        &self.dest
    }
}

impl RotationAction for MoveFileAction {
    fn name(&self) -> &str {
        "move"
    }

    fn execute(&self, fs: &dyn OutputFs, closed: &Path) -> io::Result<()> {
        let file_name = closed.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no file name", closed.display()),
            )
        })?;

        fs.create_dir_all(&self.dest)?;
        let target = self.dest.join(file_name);
        fs.rename(closed, &target)?;

        tracing::info!(
            from = %closed.display(),
            to = %target.display(),
            "moved rotated file"
        );
        Ok(())
    }
}

/// Adapts a closure into an action
pub struct FnAction<F> {
    name: String,
    f: F,
}

impl<F> FnAction<F>
where
    F: Fn(&Path) -> io::Result<()> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> RotationAction for FnAction<F>
where
    F: Fn(&Path) -> io::Result<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, _fs: &dyn OutputFs, closed: &Path) -> io::Result<()> {
        (self.f)(closed)
    }
}
