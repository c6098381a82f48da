//! Turns an [InboundRecord] into the bytes put on the stream.
//!
//! Either an [Encoder] serializes the whole record, or in payload-only mode the raw payload is
//! sent as is. Which path is used is decided once when the stage is built.
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::Result;
use crate::error::Error;
use crate::record::InboundRecord;

/// Largest data blob Kinesis accepts for a single record.
pub const MAX_RECORD_BYTES: usize = 1024 * 1024;

/// Serializes a full record. Supplied by the host.
pub trait Encoder: Send + Sync {
    /// Encodes one record. A failure only affects this record.
    fn encode(&self, record: &InboundRecord) -> Result<Bytes>;
}

/// The encode path selected at startup.
#[derive(Clone)]
pub(crate) enum RecordEncoder {
    Envelope(Arc<dyn Encoder>),
    PayloadOnly,
}

impl RecordEncoder {
    pub(crate) fn new(payload_only: bool, encoder: Option<Arc<dyn Encoder>>) -> Result<Self> {
        match (payload_only, encoder) {
            (true, encoder) => {
                if encoder.is_some() {
                    info!("payload_only is set, the configured encoder will not be used");
                }
                Ok(RecordEncoder::PayloadOnly)
            }
            (false, Some(encoder)) => Ok(RecordEncoder::Envelope(encoder)),
            (false, None) => Err(Error::Config(
                "an encoder must be specified unless payload_only is set".to_string(),
            )),
        }
    }

    pub(crate) fn encode(&self, record: &InboundRecord) -> Result<Bytes> {
        let data = match self {
            RecordEncoder::Envelope(encoder) => encoder.encode(record)?,
            RecordEncoder::PayloadOnly => record.payload().clone(),
        };
        if data.len() > MAX_RECORD_BYTES {
            return Err(Error::Encode(format!(
                "record of {} bytes exceeds the {MAX_RECORD_BYTES} byte limit",
                data.len()
            )));
        }
        Ok(data)
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    timestamp: i64,
    hostname: &'a str,
    payload: &'a str,
}

/// Encodes a record as a JSON object with its timestamp, hostname and UTF-8 payload.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonEncoder;

impl Encoder for JsonEncoder {
    fn encode(&self, record: &InboundRecord) -> Result<Bytes> {
        let payload = std::str::from_utf8(record.payload())
            .map_err(|e| Error::Encode(format!("payload is not valid UTF-8: {e}")))?;
        let envelope = Envelope {
            timestamp: record.timestamp(),
            hostname: record.hostname(),
            payload,
        };
        serde_json::to_vec(&envelope)
            .map(Bytes::from)
            .map_err(|e| Error::Encode(e.to_string()))
    }
}
