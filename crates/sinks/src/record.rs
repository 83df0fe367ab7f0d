//! Upstream records
//!
//! A record is an ordered list of byte fields plus the identity the host
//! pipeline uses to match acknowledgments. Records are immutable once built;
//! fields are `Bytes` so cloning a record never copies payload.

use std::fmt;

use bytes::Bytes;

/// Identity token used for acknowledgment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(u64);

impl RecordId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One unit of upstream data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    id: RecordId,
    fields: Vec<Bytes>,
}

impl Record {
    /// Create a record from its fields
    pub fn new(id: RecordId, fields: Vec<Bytes>) -> Self {
        Self { id, fields }
    }

    /// Create a record with a single field
    pub fn single(id: RecordId, payload: impl Into<Bytes>) -> Self {
        Self {
            id,
            fields: vec![payload.into()],
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn fields(&self) -> &[Bytes] {
        &self.fields
    }

    /// Total bytes across all fields, excluding any delimiters
    pub fn payload_len(&self) -> usize {
        self.fields.iter().map(Bytes::len).sum()
    }
}
