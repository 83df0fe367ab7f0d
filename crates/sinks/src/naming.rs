//! Output target naming
//!
//! A `FileNameFormat` maps a rotation generation and a timestamp to the path
//! of the next target. Names embed the generation so two targets of the same
//! writer never collide, even when opened within the same millisecond.
//!
//! # Available Formats
//!
//! - `DefaultFileNameFormat` - `{dir}/{prefix}{writer_id}-{generation}-{timestamp_ms}{extension}`
//! - `TimeBucketFileNameFormat` - same file name under a date (or date/hour) subdirectory

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

/// Default file extension
pub const DEFAULT_EXTENSION: &str = ".txt";

/// Target naming capability
pub trait FileNameFormat: Send + Sync {
    /// Called once when the writer starts, before the first `path` call
    fn prepare(&mut self, writer_id: &str) {
        let _ = writer_id;
    }

    /// Full path of the target for this generation
    fn path(&self, generation: u64, timestamp_ms: i64) -> PathBuf;
}

/// Flat directory of generation-stamped files
#[derive(Debug, Clone)]
pub struct DefaultFileNameFormat {
    dir: PathBuf,
    prefix: String,
    extension: String,
    writer_id: String,
}

impl DefaultFileNameFormat {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: String::new(),
            extension: DEFAULT_EXTENSION.into(),
            writer_id: String::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name without directory
    pub fn name(&self, generation: u64, timestamp_ms: i64) -> String {
        file_name(
            &self.prefix,
            &self.writer_id,
            generation,
            timestamp_ms,
            &self.extension,
        )
    }
}

impl FileNameFormat for DefaultFileNameFormat {
    fn prepare(&mut self, writer_id: &str) {
        self.writer_id = writer_id.to_string();
    }

    fn path(&self, generation: u64, timestamp_ms: i64) -> PathBuf {
        self.dir.join(self.name(generation, timestamp_ms))
    }
}

/// Date subdirectory granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBucket {
    /// `{YYYY-MM-DD}/`
    Daily,
    /// `{YYYY-MM-DD}/{HH}/`
    Hourly,
}

impl TimeBucket {
    fn date_format(&self) -> &'static str {
        match self {
            TimeBucket::Daily => "%Y-%m-%d",
            TimeBucket::Hourly => "%Y-%m-%d/%H",
        }
    }

    /// Subdirectory for a UTC timestamp
    pub fn bucket(&self, timestamp_ms: i64) -> String {
        let at = DateTime::<Utc>::from_timestamp_millis(timestamp_ms).unwrap_or_default();
        at.format(self.date_format()).to_string()
    }
}

/// Generation-stamped files grouped into UTC date directories
#[derive(Debug, Clone)]
pub struct TimeBucketFileNameFormat {
    inner: DefaultFileNameFormat,
    bucket: TimeBucket,
}

impl TimeBucketFileNameFormat {
    pub fn new(dir: impl Into<PathBuf>, bucket: TimeBucket) -> Self {
        Self {
            inner: DefaultFileNameFormat::new(dir),
            bucket,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.inner = self.inner.with_prefix(prefix);
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.inner = self.inner.with_extension(extension);
        self
    }
}

impl FileNameFormat for TimeBucketFileNameFormat {
    fn prepare(&mut self, writer_id: &str) {
        self.inner.prepare(writer_id);
    }

    fn path(&self, generation: u64, timestamp_ms: i64) -> PathBuf {
        self.inner
            .dir()
            .join(self.bucket.bucket(timestamp_ms))
            .join(self.inner.name(generation, timestamp_ms))
    }
}

fn file_name(
    prefix: &str,
    writer_id: &str,
    generation: u64,
    timestamp_ms: i64,
    extension: &str,
) -> String {
    if writer_id.is_empty() {
        format!("{prefix}{generation}-{timestamp_ms}{extension}")
    } else {
        format!("{prefix}{writer_id}-{generation}-{timestamp_ms}{extension}")
    }
}

#[cfg(test)]
#[path = "naming_test.rs"]
mod naming_test;
