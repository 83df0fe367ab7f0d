//! Writer configuration types
//!
//! One `[writer]` section describes a single rotating writer: where files go,
//! how they are named and serialized, and the sync, rotation and action
//! settings.

use serde::Deserialize;
use std::time::Duration;

/// Default writer identifier
pub const DEFAULT_WRITER_ID: &str = "roller";

/// Default record channel capacity
pub const DEFAULT_QUEUE_SIZE: usize = 1000;

/// Default write buffer size (64KB)
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Default records between durable syncs
pub const DEFAULT_SYNC_COUNT: u64 = 1000;

/// Rotating writer configuration
///
/// # Example
///
/// ```toml
/// [writer]
/// path = "out/"
/// prefix = "events-"
/// layout = "daily"
///
/// [writer.sync]
/// interval = "5s"
///
/// [writer.rotation]
/// type = "size"
/// size = 64.0
/// unit = "mb"
///
/// [[writer.actions]]
/// type = "move"
/// dest = "done/"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WriterSection {
    /// Identifier used in file names and logs
    pub id: String,

    /// Output root directory (required)
    pub path: String,

    /// File name prefix
    pub prefix: String,

    /// File name extension, including the dot
    pub extension: String,

    /// Directory layout under `path`
    pub layout: Layout,

    /// Separator between fields of a record
    pub field_delimiter: String,

    /// Terminator after each record
    pub record_delimiter: String,

    /// Emit only these field indices, in this order
    pub fields: Option<Vec<usize>>,

    /// Record channel capacity
    pub queue_size: usize,

    /// Write buffer size per open file (0 = unbuffered)
    pub buffer_size: usize,

    /// Durable sync trigger
    pub sync: SyncConfig,

    /// Rotation trigger
    pub rotation: RotationConfig,

    /// Actions run on every closed file, in order
    pub actions: Vec<ActionConfig>,

    /// Stop writing after this many rotations in a row fail to open a new
    /// file; unset keeps retrying on every write
    pub max_rotation_failures: Option<u32>,
}

impl Default for WriterSection {
    fn default() -> Self {
        Self {
            id: DEFAULT_WRITER_ID.into(),
            path: String::new(),
            prefix: String::new(),
            extension: ".txt".into(),
            layout: Layout::Flat,
            field_delimiter: ",".into(),
            record_delimiter: "\n".into(),
            fields: None,
            queue_size: DEFAULT_QUEUE_SIZE,
            buffer_size: DEFAULT_BUFFER_SIZE,
            sync: SyncConfig {
                count: Some(DEFAULT_SYNC_COUNT),
                interval: None,
            },
            rotation: RotationConfig::default(),
            actions: Vec::new(),
            max_rotation_failures: None,
        }
    }
}

/// Directory layout for output files
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// All files directly under the output root (default)
    #[default]
    Flat,
    /// `{path}/YYYY-MM-DD/`
    Daily,
    /// `{path}/YYYY-MM-DD/HH/`
    Hourly,
}

/// Durable sync trigger
///
/// Exactly one of `count` or `interval` must be set.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct SyncConfig {
    /// Sync after this many records
    #[serde(default)]
    pub count: Option<u64>,

    /// Sync once this much time has passed since the last sync
    #[serde(default, with = "humantime_serde")]
    pub interval: Option<Duration>,
}

/// Size unit for size-based rotation
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SizeUnit {
    Kb,
    #[default]
    Mb,
    Gb,
    Tb,
}

/// Rotation trigger
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RotationConfig {
    /// Rotate once the file reaches `size` × `unit` bytes
    Size {
        #[serde(default = "default_rotation_size")]
        size: f64,
        #[serde(default)]
        unit: SizeUnit,
    },

    /// Rotate after this many records
    Count { count: u64 },

    /// Rotate on a fixed schedule, even when idle
    Timed {
        #[serde(with = "humantime_serde")]
        interval: Duration,
    },
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self::Size {
            size: default_rotation_size(),
            unit: SizeUnit::Mb,
        }
    }
}

impl RotationConfig {
    /// Get the rotation type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Size { .. } => "size",
            Self::Count { .. } => "count",
            Self::Timed { .. } => "timed",
        }
    }
}

fn default_rotation_size() -> f64 {
    5.0
}

/// Action run on every closed file
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionConfig {
    /// Move the closed file into `dest`
    Move { dest: String },
}

impl ActionConfig {
    /// Get the action type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Move { .. } => "move",
        }
    }
}
