//! Record serialization
//!
//! A `RecordFormat` turns one record into the exact bytes appended to the
//! current target. The writer advances its offset by the returned length.

use bytes::{BufMut, Bytes, BytesMut};

use crate::common::Result;
use crate::record::Record;

/// Record serialization capability
pub trait RecordFormat: Send + Sync {
    /// Encode `record` as it should appear in the output
    fn format(&self, record: &Record) -> Result<Bytes>;
}

/// Default separator between fields
pub const DEFAULT_FIELD_DELIMITER: &str = ",";

/// Default terminator after each record
pub const DEFAULT_RECORD_DELIMITER: &str = "\n";

/// Joins fields with a field delimiter and terminates each record
///
/// ```text
/// field0,field1,field2\n
/// ```
#[derive(Debug, Clone)]
pub struct DelimitedRecordFormat {
    field_delimiter: Bytes,
    record_delimiter: Bytes,
    fields: Option<Vec<usize>>,
}

impl DelimitedRecordFormat {
    pub fn new() -> Self {
        Self {
            field_delimiter: Bytes::from_static(DEFAULT_FIELD_DELIMITER.as_bytes()),
            record_delimiter: Bytes::from_static(DEFAULT_RECORD_DELIMITER.as_bytes()),
            fields: None,
        }
    }

    /// Use a custom field delimiter
    pub fn with_field_delimiter(mut self, delimiter: impl Into<Bytes>) -> Self {
        self.field_delimiter = delimiter.into();
        self
    }

    /// Use a custom record delimiter
    pub fn with_record_delimiter(mut self, delimiter: impl Into<Bytes>) -> Self {
        self.record_delimiter = delimiter.into();
        self
    }

    /// Only emit the fields at these indices, in this order
    pub fn with_fields(mut self, indices: Vec<usize>) -> Self {
        self.fields = Some(indices);
        self
    }

    fn encoded_len(&self, fields: &[&Bytes]) -> usize {
        let payload: usize = fields.iter().map(|f| f.len()).sum();
        let separators = fields.len().saturating_sub(1) * self.field_delimiter.len();
        payload + separators + self.record_delimiter.len()
    }
}

impl Default for DelimitedRecordFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordFormat for DelimitedRecordFormat {
    fn format(&self, record: &Record) -> Result<Bytes> {
        let selected: Vec<&Bytes> = match &self.fields {
            None => record.fields().iter().collect(),
            Some(indices) => indices
                .iter()
                .map(|&i| {
                    record.fields().get(i).ok_or_else(|| {
                        crate::SinkError::serialization(format!(
                            "record {} has no field {i}",
                            record.id()
                        ))
                    })
                })
                .collect::<Result<_>>()?,
        };

        let mut buf = BytesMut::with_capacity(self.encoded_len(&selected));
        for (i, field) in selected.iter().enumerate() {
            if i > 0 {
                buf.put_slice(&self.field_delimiter);
            }
            buf.put_slice(field);
        }
        buf.put_slice(&self.record_delimiter);

        Ok(buf.freeze())
    }
}
