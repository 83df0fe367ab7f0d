use std::fmt;

use crate::action::RotationAction;
use crate::format::RecordFormat;
use crate::naming::FileNameFormat;
use crate::policy::{RotationPolicy, SyncPolicy};

/// Default writer identifier
pub const DEFAULT_WRITER_ID: &str = "roller";

/// Everything a `RotatingWriter` is built from
///
/// Assembled once and handed to `RotatingWriter::open`; nothing in it can be
/// changed afterwards. The output root is part of the file name format.
pub struct WriterConfig {
    /// Identifier used in file names and logs
    pub id: String,

    /// Naming strategy for each generation's target
    pub file_name_format: Box<dyn FileNameFormat>,

    /// Serialization strategy for records
    pub record_format: Box<dyn RecordFormat>,

    /// When to make the current target durable
    pub sync_policy: Box<dyn SyncPolicy>,

    /// When to close the current target and open the next
    pub rotation_policy: Box<dyn RotationPolicy>,

    /// Hooks run, in order, on every closed target
    pub actions: Vec<Box<dyn RotationAction>>,
}

impl WriterConfig {
    pub fn new(
        file_name_format: impl FileNameFormat + 'static,
        record_format: impl RecordFormat + 'static,
        sync_policy: impl SyncPolicy + 'static,
        rotation_policy: impl RotationPolicy + 'static,
    ) -> Self {
        Self {
            id: DEFAULT_WRITER_ID.into(),
            file_name_format: Box::new(file_name_format),
            record_format: Box::new(record_format),
            sync_policy: Box::new(sync_policy),
            rotation_policy: Box::new(rotation_policy),
            actions: Vec::new(),
        }
    }

    /// Create config with a custom writer id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Append a rotation action; actions run in the order they are added
    pub fn with_action(mut self, action: impl RotationAction + 'static) -> Self {
        self.actions.push(Box::new(action));
        self
    }

    /// Append an already boxed rotation action
    pub fn with_boxed_action(mut self, action: Box<dyn RotationAction>) -> Self {
        self.actions.push(action);
        self
    }
}

impl fmt::Debug for WriterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let actions: Vec<&str> = self.actions.iter().map(|a| a.name()).collect();
        f.debug_struct("WriterConfig")
            .field("id", &self.id)
            .field("actions", &actions)
            .finish_non_exhaustive()
    }
}
