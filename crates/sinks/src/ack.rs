//! Acknowledgment back to the host pipeline
//!
//! The writer reports every record exactly once: `ack` after its bytes are
//! appended (and synced, when the sync policy asked for it), `fail` otherwise.
//! The host decides whether to redeliver failed records.

use tokio::sync::mpsc;

use crate::record::{Record, RecordId};

/// Host pipeline acknowledgment capability
pub trait Acknowledger: Send + Sync {
    /// Record was written and may be released upstream
    fn ack(&self, record: &Record);

    /// Record was not written and should be redelivered
    fn fail(&self, record: &Record);
}

/// Outcome delivered over a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckEvent {
    Ack(RecordId),
    Fail(RecordId),
}

impl AckEvent {
    pub fn id(&self) -> RecordId {
        match self {
            Self::Ack(id) | Self::Fail(id) => *id,
        }
    }
}

/// Sends acknowledgments to the host over an unbounded channel
///
/// Unbounded so that acknowledging never blocks a writer; the host drains
/// the receiver at its own pace.
#[derive(Debug, Clone)]
pub struct ChannelAcknowledger {
    sender: mpsc::UnboundedSender<AckEvent>,
}

impl ChannelAcknowledger {
    pub fn new(sender: mpsc::UnboundedSender<AckEvent>) -> Self {
        Self { sender }
    }

    /// Create an acknowledger together with the host-side receiver
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<AckEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }

    fn send(&self, event: AckEvent) {
        if self.sender.send(event).is_err() {
            tracing::debug!(record = %event.id(), "ack receiver dropped");
        }
    }
}

impl Acknowledger for ChannelAcknowledger {
    fn ack(&self, record: &Record) {
        self.send(AckEvent::Ack(record.id()));
    }

    fn fail(&self, record: &Record) {
        self.send(AckEvent::Fail(record.id()));
    }
}

/// Discards acknowledgments (for hosts without replay)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAcknowledger;

impl Acknowledger for NoopAcknowledger {
    fn ack(&self, _record: &Record) {}

    fn fail(&self, _record: &Record) {}
}
