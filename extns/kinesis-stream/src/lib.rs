//! Library for writing records to Amazon Kinesis Data Streams.
//!
//! This crate wraps the AWS SDK with the pieces an output stage needs:
//! - Region validation against the regions Kinesis is served from
//! - An ordered credential provider chain (static keys, then instance role)
//! - A single-record `PutRecord` sink with SDK retries disabled
use std::fmt::Debug;

use aws_config::BehaviorVersion;
use aws_sdk_kinesis::Client;
use aws_sdk_kinesis::config::Region;
use aws_sdk_kinesis::config::retry::RetryConfig;
use aws_sdk_kinesis::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

use crate::sink::KinesisSinkConfig;

pub mod credentials;
pub mod sink;

pub const KINESIS_DEFAULT_REGION: &str = "us-east-1";

/// Regions with a Kinesis Data Streams endpoint.
const KNOWN_REGIONS: &[&str] = &[
    "af-south-1",
    "ap-east-1",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-northeast-3",
    "ap-south-1",
    "ap-south-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-southeast-3",
    "ap-southeast-4",
    "ap-southeast-5",
    "ap-southeast-7",
    "ca-central-1",
    "ca-west-1",
    "cn-north-1",
    "cn-northwest-1",
    "eu-central-1",
    "eu-central-2",
    "eu-north-1",
    "eu-south-1",
    "eu-south-2",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "il-central-1",
    "me-central-1",
    "me-south-1",
    "mx-central-1",
    "sa-east-1",
    "us-east-1",
    "us-east-2",
    "us-gov-east-1",
    "us-gov-west-1",
    "us-west-1",
    "us-west-2",
];

/// Custom error types for the Kinesis client library.
#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    #[error("Failed with Kinesis error - {0}")]
    Kinesis(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = core::result::Result<T, Error>;

/// Behavior version pinned for every client this crate creates.
pub fn aws_behavior_version() -> BehaviorVersion {
    BehaviorVersion::latest()
}

/// Returns true when `region` is a region Kinesis is served from.
pub fn is_known_region(region: &str) -> bool {
    KNOWN_REGIONS.contains(&region)
}

/// Flattens an SDK error into `<code>: <message>`, falling back to the full error chain when the
/// service did not return any metadata (e.g. dispatch or credential failures).
pub(crate) fn extract_aws_error<E, R>(err: &SdkError<E, R>) -> String
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: Debug,
{
    match (err.code(), err.message()) {
        (Some(code), Some(message)) => format!("{code}: {message}"),
        (Some(code), None) => code.to_string(),
        _ => DisplayErrorContext(err).to_string(),
    }
}

/// Creates a Kinesis client for the given sink configuration.
///
/// No request is made here. Credentials are resolved by the client on the first call, so an
/// instance role attached after startup is still picked up.
pub fn create_kinesis_client(config: &KinesisSinkConfig) -> Result<Client> {
    config.validate()?;

    tracing::info!(
        region = %config.region,
        stream = %config.stream_name,
        "Creating Kinesis client in region"
    );

    let sources = credentials::credential_sources(config.credentials.as_ref());
    let provider = credentials::provider_chain(sources)?;

    let mut config_builder = aws_sdk_kinesis::Config::builder()
        .behavior_version(aws_behavior_version())
        .region(Region::new(config.region.clone()))
        .credentials_provider(provider)
        // one record, one round trip; the caller owns any retry policy
        .retry_config(RetryConfig::disabled());

    if let Some(endpoint_url) = &config.endpoint_url {
        config_builder = config_builder.endpoint_url(endpoint_url);
    }

    Ok(Client::from_conf(config_builder.build()))
}
