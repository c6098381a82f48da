use std::sync::Arc;

use kinesis_stream::sink::{KinesisSink, KinesisSinkBuilder};
use tracing::info;

use crate::Result;
use crate::config::OutputConfig;
use crate::delivery::{ErrorReporter, KinesisOutput, TracingReporter};
use crate::encoder::{Encoder, RecordEncoder};
use crate::sinker::StreamClient;

/// Builds a [KinesisOutput] owned by the host.
///
/// All configuration errors surface here: an unknown region, an empty stream name, or a missing
/// encoder when `payload_only` is not set. A stage that fails to build never sees a record.
pub struct OutputBuilder {
    config: OutputConfig,
    encoder: Option<Arc<dyn Encoder>>,
    reporter: Arc<dyn ErrorReporter>,
}

impl OutputBuilder {
    pub fn new(config: OutputConfig) -> Self {
        Self {
            config,
            encoder: None,
            reporter: Arc::new(TracingReporter),
        }
    }

    /// Encoder used unless `payload_only` is set.
    pub fn encoder(mut self, encoder: Arc<dyn Encoder>) -> Self {
        self.encoder = Some(encoder);
        self
    }

    /// Replaces the default [TracingReporter].
    pub fn reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Builds the stage on top of a Kinesis client created from the configuration.
    pub fn build(self) -> Result<KinesisOutput<KinesisSink>> {
        let sink = KinesisSinkBuilder::new(self.config.sink_config()).build()?;
        self.build_with_client(sink)
    }

    /// Builds the stage on top of the given client.
    pub fn build_with_client<C>(self, client: C) -> Result<KinesisOutput<C>>
    where
        C: StreamClient,
    {
        self.config.validate()?;
        let encoder = RecordEncoder::new(self.config.payload_only, self.encoder)?;

        info!(
            config = ?self.config,
            "Kinesis output configured"
        );

        Ok(KinesisOutput::new(
            self.config.stream,
            encoder,
            client,
            self.reporter,
        ))
    }
}
