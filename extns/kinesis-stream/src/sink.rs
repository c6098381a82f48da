//! Module for writing single records to a Kinesis data stream.
//!
//! Every call is one `PutRecord` round trip. Nothing is batched, buffered or retried here; the
//! outcome is handed straight back to the caller.
use aws_sdk_kinesis::Client;
use aws_sdk_kinesis::primitives::Blob;
use bytes::Bytes;

use crate::credentials::StaticCredentials;
use crate::{Error, Result, extract_aws_error, is_known_region};

/// Configuration for the Kinesis sink.
#[derive(Clone, Debug, PartialEq)]
pub struct KinesisSinkConfig {
    /// AWS region the stream lives in
    pub region: String,
    /// Name of the Kinesis data stream
    pub stream_name: String,
    /// Static credentials, preferred over the instance role when present
    pub credentials: Option<StaticCredentials>,
    /// Endpoint override, e.g. a local emulator
    pub endpoint_url: Option<String>,
}

impl KinesisSinkConfig {
    pub fn validate(&self) -> Result<()> {
        if self.stream_name.is_empty() {
            return Err(Error::InvalidConfig(
                "stream name must not be empty".to_string(),
            ));
        }
        if self.region.is_empty() {
            return Err(Error::InvalidConfig("region must not be empty".to_string()));
        }
        if !is_known_region(&self.region) {
            return Err(Error::InvalidConfig(format!(
                "region does not exist: {}",
                self.region
            )));
        }
        Ok(())
    }
}

/// A single record to put on a stream.
#[derive(Clone, Debug, PartialEq)]
pub struct PutRecordRequest {
    /// Record payload
    pub data: Bytes,
    /// Determines the shard the record lands on
    pub partition_key: String,
    /// Target stream
    pub stream_name: String,
}

/// Placement of a record acknowledged by the service.
#[derive(Clone, Debug, PartialEq)]
pub struct PutRecordResponse {
    pub shard_id: String,
    pub sequence_number: String,
}

/// Kinesis sink that puts one record per call.
#[derive(Clone, Debug)]
pub struct KinesisSink {
    client: Client,
}

/// Builder for creating and configuring a Kinesis sink.
#[derive(Clone, Debug)]
pub struct KinesisSinkBuilder {
    config: KinesisSinkConfig,
    client: Option<Client>,
}

impl KinesisSinkBuilder {
    pub fn new(config: KinesisSinkConfig) -> Self {
        Self {
            config,
            client: None,
        }
    }

    /// Uses an already configured client instead of creating one from the config.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Validates the configuration and builds the sink. No network call is made.
    pub fn build(self) -> Result<KinesisSink> {
        let client = match self.client {
            Some(client) => {
                self.config.validate()?;
                client
            }
            None => crate::create_kinesis_client(&self.config)?,
        };
        Ok(KinesisSink { client })
    }
}

impl KinesisSink {
    /// Puts a single record on the stream named in the request.
    pub async fn put_record(&self, request: PutRecordRequest) -> Result<PutRecordResponse> {
        let output = self
            .client
            .put_record()
            .stream_name(request.stream_name)
            .partition_key(request.partition_key)
            .data(Blob::new(request.data.to_vec()))
            .send()
            .await
            .map_err(|err| Error::Kinesis(extract_aws_error(&err)))?;

        Ok(PutRecordResponse {
            shard_id: output.shard_id().to_string(),
            sequence_number: output.sequence_number().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use aws_sdk_kinesis::operation::put_record::{PutRecordError, PutRecordOutput};
    use aws_smithy_mocks::{Rule, RuleMode, mock, mock_client};
    use aws_smithy_types::error::ErrorMetadata;
    use bytes::Bytes;
    use test_log::test;

    use super::*;
    use crate::KINESIS_DEFAULT_REGION;

    fn test_config() -> KinesisSinkConfig {
        KinesisSinkConfig {
            region: KINESIS_DEFAULT_REGION.to_string(),
            stream_name: "events".to_string(),
            credentials: StaticCredentials::from_parts(
                Some("ATESTCLIENT".to_string()),
                Some("astestsecretkey".to_string()),
                Some("atestsessiontoken".to_string()),
            ),
            endpoint_url: None,
        }
    }

    fn put_record_output() -> Rule {
        mock!(aws_sdk_kinesis::Client::put_record)
            .match_requests(|inp| inp.stream_name() == Some("events"))
            .then_output(|| {
                PutRecordOutput::builder()
                    .shard_id("shardId-000000000000")
                    .sequence_number("49590338271490256608559692538361571095921575989136588898")
                    .build()
                    .unwrap()
            })
    }

    fn put_record_throttled() -> Rule {
        mock!(aws_sdk_kinesis::Client::put_record).then_error(|| {
            PutRecordError::generic(
                ErrorMetadata::builder()
                    .code("ProvisionedThroughputExceededException")
                    .message("Rate exceeded for shard shardId-000000000000")
                    .build(),
            )
        })
    }

    #[test]
    fn test_kinesis_sink_builder() {
        let client = mock_client!(aws_sdk_kinesis, RuleMode::MatchAny, [&put_record_output()]);

        // an injected client does not bypass validation
        let mut config = test_config();
        config.stream_name = String::new();
        let result = KinesisSinkBuilder::new(config).client(client.clone()).build();
        assert!(matches!(result, Err(Error::InvalidConfig(_))));

        let sink = KinesisSinkBuilder::new(test_config()).client(client).build();
        assert!(sink.is_ok());
    }

    #[test]
    fn test_kinesis_sink_builder_rejects_unknown_region() {
        let mut config = test_config();
        config.region = "moon-base-1".to_string();
        let result = KinesisSinkBuilder::new(config).build();
        assert!(matches!(result, Err(Error::InvalidConfig(msg)) if msg.contains("moon-base-1")));
    }

    #[test(tokio::test)]
    async fn test_put_record() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&seen);
        let rule = mock!(aws_sdk_kinesis::Client::put_record)
            .match_requests(move |inp| {
                recorded.lock().unwrap().push((
                    inp.stream_name().map(str::to_string),
                    inp.partition_key().map(str::to_string),
                    inp.data().map(|d| d.as_ref().to_vec()),
                ));
                true
            })
            .then_output(|| {
                PutRecordOutput::builder()
                    .shard_id("shardId-000000000001")
                    .sequence_number("1")
                    .build()
                    .unwrap()
            });

        let client = mock_client!(aws_sdk_kinesis, RuleMode::MatchAny, [&rule]);
        let sink = KinesisSinkBuilder::new(test_config())
            .client(client)
            .build()
            .unwrap();

        let response = sink
            .put_record(PutRecordRequest {
                data: Bytes::from("hello"),
                partition_key: "100-h1".to_string(),
                stream_name: "events".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(
            response,
            PutRecordResponse {
                shard_id: "shardId-000000000001".to_string(),
                sequence_number: "1".to_string(),
            }
        );

        let seen = seen.lock().unwrap();
        assert_eq!(
            seen.last(),
            Some(&(
                Some("events".to_string()),
                Some("100-h1".to_string()),
                Some(b"hello".to_vec())
            ))
        );
    }

    #[test(tokio::test)]
    async fn test_put_record_matches_stream() {
        let client = mock_client!(aws_sdk_kinesis, RuleMode::MatchAny, [&put_record_output()]);
        let sink = KinesisSinkBuilder::new(test_config())
            .client(client)
            .build()
            .unwrap();

        let response = sink
            .put_record(PutRecordRequest {
                data: Bytes::from_static(b"{\"a\":1}"),
                partition_key: "1-host".to_string(),
                stream_name: "events".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(response.shard_id, "shardId-000000000000");
    }

    #[test(tokio::test)]
    async fn test_put_record_service_error() {
        let client = mock_client!(
            aws_sdk_kinesis,
            RuleMode::MatchAny,
            [&put_record_throttled()]
        );
        let sink = KinesisSinkBuilder::new(test_config())
            .client(client)
            .build()
            .unwrap();

        let result = sink
            .put_record(PutRecordRequest {
                data: Bytes::from("hello"),
                partition_key: "100-h1".to_string(),
                stream_name: "events".to_string(),
            })
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, Error::Kinesis(_)));
        // error carries both code and message from AWS
        let msg = err.to_string();
        assert!(msg.contains("Failed with Kinesis error"));
        assert!(msg.contains("ProvisionedThroughputExceededException"));
        assert!(msg.contains("Rate exceeded"));
    }
}
