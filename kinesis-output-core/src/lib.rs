//! Output stage that delivers pipeline records to a Kinesis data stream.
//!
//! The host builds a [KinesisOutput] with [OutputBuilder] and runs it on its own task over an
//! inbound channel of [InboundRecord]s:
//! - each record is encoded by an [Encoder] (or sent as its raw payload in `payload_only` mode)
//! - a partition key `<timestamp>-<hostname>` is derived
//! - the record is put on the stream with a single `PutRecord` call
//!
//! A failing record is reported through the [ErrorReporter] and dropped; it never stops the
//! stage. Every record is released back to the host exactly once.

pub use crate::error::{Error, Result};

mod error;

pub mod builder;
pub mod config;
pub mod delivery;
pub mod encoder;
pub mod partition;
pub mod record;
pub mod sinker;

pub use builder::OutputBuilder;
pub use config::OutputConfig;
pub use delivery::{DeliveryStats, ErrorReporter, KinesisOutput, Stage, TracingReporter};
pub use encoder::{Encoder, JsonEncoder};
pub use kinesis_stream::sink::{KinesisSink, PutRecordRequest, PutRecordResponse};
pub use record::{InboundRecord, Release};
pub use sinker::StreamClient;
