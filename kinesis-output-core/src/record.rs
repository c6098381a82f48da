//! Records handed to the output stage by the host pipeline.
//!
//! The host keeps ownership of a record's lifecycle: it creates the record together with a
//! receiver and learns through that receiver when the stage is done with it. The notification is
//! sent from [Drop], so a record is released exactly once no matter which path the delivery
//! attempt took. A record counts as delivered only once the stage has marked it so; one dropped
//! for any other reason, including a panic or an abandoned stage, is released as failed.
use bytes::Bytes;
use tokio::sync::oneshot;

/// Outcome reported to the host when a record is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// The record was appended to the stream.
    Delivered,
    /// The record was not appended to the stream.
    Failed,
}

/// Sends the [Release] notification when dropped.
#[derive(Debug)]
pub struct ReleaseHandle {
    notify: Option<oneshot::Sender<Release>>,
    delivered: bool,
}

impl ReleaseHandle {
    fn new(notify: oneshot::Sender<Release>) -> Self {
        Self {
            notify: Some(notify),
            delivered: false,
        }
    }
}

impl Drop for ReleaseHandle {
    fn drop(&mut self) {
        if let Some(notify) = self.notify.take() {
            let release = if self.delivered {
                Release::Delivered
            } else {
                Release::Failed
            };
            // the host may have stopped listening, there is nobody else to tell
            let _ = notify.send(release);
        }
    }
}

/// A unit of work owned by the host pipeline for the duration of one delivery attempt.
#[derive(Debug)]
pub struct InboundRecord {
    payload: Bytes,
    /// nanoseconds since the unix epoch
    timestamp: i64,
    hostname: String,
    release: ReleaseHandle,
}

impl InboundRecord {
    /// Creates a record and the receiver on which its release is reported.
    pub fn new(
        payload: impl Into<Bytes>,
        timestamp: i64,
        hostname: impl Into<String>,
    ) -> (Self, oneshot::Receiver<Release>) {
        let (tx, rx) = oneshot::channel();
        let record = Self {
            payload: payload.into(),
            timestamp,
            hostname: hostname.into(),
            release: ReleaseHandle::new(tx),
        };
        (record, rx)
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Marks the record so its release reports [Release::Delivered].
    pub(crate) fn mark_delivered(&mut self) {
        self.release.delivered = true;
    }
}
