//! The delivery loop drains the inbound channel one record at a time:
//!
//! ```text
//! Received -> Encoding -> KeyDerivation -> Sending -> (Delivered | Failed) -> Released
//! ```
//!
//! A failed record is reported once and dropped. The loop never retries and never stops because of
//! a single record; it ends only when the host closes the inbound channel. Every record is
//! released exactly once when it goes out of scope at the end of its iteration, see
//! [crate::record].
use std::fmt;
use std::sync::Arc;

use kinesis_stream::sink::{PutRecordRequest, PutRecordResponse};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::encoder::RecordEncoder;
use crate::error::Error;
use crate::partition::partition_key;
use crate::record::InboundRecord;
use crate::sinker::StreamClient;

/// Stage of the delivery attempt at which a record failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Encode,
    PutRecord,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Encode => write!(f, "encoding message"),
            Stage::PutRecord => write!(f, "pushing message to Kinesis"),
        }
    }
}

/// Receives record-scoped failures. Must not fail or panic.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, stage: Stage, record: &InboundRecord, error: &Error);
}

/// Reports failures as `tracing` error events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, stage: Stage, record: &InboundRecord, error: &Error) {
        error!(
            %stage,
            timestamp = record.timestamp(),
            hostname = record.hostname(),
            %error,
            "Error {stage}"
        );
    }
}

/// Counters returned once the inbound channel is closed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryStats {
    pub delivered: u64,
    pub failed: u64,
}

struct Failure {
    stage: Stage,
    error: Error,
}

/// Output stage delivering each inbound record as one Kinesis record.
///
/// Build it with [crate::OutputBuilder].
pub struct KinesisOutput<C> {
    stream: String,
    encoder: RecordEncoder,
    client: C,
    reporter: Arc<dyn ErrorReporter>,
}

impl<C> KinesisOutput<C>
where
    C: StreamClient,
{
    pub(crate) fn new(
        stream: String,
        encoder: RecordEncoder,
        client: C,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            stream,
            encoder,
            client,
            reporter,
        }
    }

    pub fn stream(&self) -> &str {
        &self.stream
    }

    /// Consumes records until the inbound channel is closed and drained.
    pub async fn run(mut self, mut inbound: mpsc::Receiver<InboundRecord>) -> DeliveryStats {
        info!(stream = %self.stream, "Starting Kinesis output");
        let mut stats = DeliveryStats::default();

        while let Some(mut record) = inbound.recv().await {
            match self.deliver(&record).await {
                Ok(response) => {
                    stats.delivered += 1;
                    record.mark_delivered();
                    debug!(
                        shard_id = response.shard_id,
                        sequence_number = response.sequence_number,
                        "Record delivered"
                    );
                }
                Err(Failure { stage, error }) => {
                    stats.failed += 1;
                    self.reporter.report(stage, &record, &error);
                }
            }
            // `record` goes out of scope here and is released to the host
        }

        info!(
            stream = %self.stream,
            delivered = stats.delivered,
            failed = stats.failed,
            "Inbound channel closed, stopping Kinesis output"
        );
        stats
    }

    async fn deliver(
        &mut self,
        record: &InboundRecord,
    ) -> std::result::Result<PutRecordResponse, Failure> {
        let data = self.encoder.encode(record).map_err(|error| Failure {
            stage: Stage::Encode,
            error,
        })?;

        let partition_key = partition_key(record.timestamp(), record.hostname());
        debug!(partition_key, bytes = data.len(), "Putting record");

        let request = PutRecordRequest {
            data,
            partition_key,
            stream_name: self.stream.clone(),
        };

        self.client
            .put_record(request)
            .await
            .map_err(|error| Failure {
                stage: Stage::PutRecord,
                error,
            })
    }
}
