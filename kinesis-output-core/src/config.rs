//! Configuration of the output stage.
//!
//! Values come from an optional TOML file, overridden by `KINESIS_OUTPUT_*` environment
//! variables, e.g. `KINESIS_OUTPUT_STREAM=events`. The result is validated once before the stage
//! is built and never changes afterwards.
use std::fmt;
use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use kinesis_stream::credentials::StaticCredentials;
use kinesis_stream::sink::KinesisSinkConfig;
use serde::Deserialize;
use tracing::info;

use crate::Result;
use crate::error::Error;

const ENV_PREFIX: &str = "KINESIS_OUTPUT";

fn default_region() -> String {
    kinesis_stream::KINESIS_DEFAULT_REGION.to_string()
}

#[derive(Clone, PartialEq, Deserialize)]
pub struct OutputConfig {
    /// AWS region of the stream.
    #[serde(default = "default_region")]
    pub region: String,
    /// Name of the target stream.
    #[serde(default)]
    pub stream: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub token: Option<String>,
    /// Send only the raw payload of each record instead of the encoder's output.
    #[serde(default)]
    pub payload_only: bool,
    /// Overrides the service endpoint.
    pub endpoint_url: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            stream: String::new(),
            access_key_id: None,
            secret_access_key: None,
            token: None,
            payload_only: false,
            endpoint_url: None,
        }
    }
}

impl fmt::Debug for OutputConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputConfig")
            .field("region", &self.region)
            .field("stream", &self.stream)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "** redacted **"),
            )
            .field("token", &self.token.as_ref().map(|_| "** redacted **"))
            .field("payload_only", &self.payload_only)
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

impl OutputConfig {
    pub fn new(stream: impl Into<String>) -> Self {
        Self {
            stream: stream.into(),
            ..Default::default()
        }
    }

    /// Loads the configuration from an optional TOML file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_from_sources(path, None)
    }

    /// Same as [OutputConfig::load], reading environment overrides from `env` instead of the
    /// process environment when given.
    pub fn load_from_sources(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            info!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .source(env),
            )
            .build()
            .map_err(|e| Error::Config(format!("generating output configuration: {e}")))?;

        settings
            .try_deserialize::<Self>()
            .map_err(|e| Error::Config(format!("parsing output configuration: {e}")))
    }

    /// Static credentials, present only when both the key id and the secret are set.
    pub fn static_credentials(&self) -> Option<StaticCredentials> {
        StaticCredentials::from_parts(
            self.access_key_id.clone(),
            self.secret_access_key.clone(),
            self.token.clone(),
        )
    }

    pub(crate) fn sink_config(&self) -> KinesisSinkConfig {
        KinesisSinkConfig {
            region: self.region.clone(),
            stream_name: self.stream.clone(),
            credentials: self.static_credentials(),
            endpoint_url: self.endpoint_url.clone(),
        }
    }

    /// Checks that the stream is named and the region is one Kinesis is served from.
    pub fn validate(&self) -> Result<()> {
        self.sink_config().validate().map_err(Error::from)
    }
}
