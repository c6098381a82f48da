use kinesis_stream::sink::{KinesisSink, PutRecordRequest, PutRecordResponse};

use crate::Result;
use crate::error::Error;
use crate::sinker::StreamClient;

impl StreamClient for KinesisSink {
    async fn put_record(&mut self, request: PutRecordRequest) -> Result<PutRecordResponse> {
        KinesisSink::put_record(self, request)
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_kinesis::operation::put_record::{PutRecordError, PutRecordOutput};
    use aws_sdk_kinesis::error::ErrorMetadata;
    use aws_smithy_mocks::{RuleMode, mock, mock_client};
    use bytes::Bytes;
    use kinesis_stream::sink::KinesisSinkBuilder;

    use super::*;
    use crate::config::OutputConfig;

    fn sink_with(client: aws_sdk_kinesis::Client) -> KinesisSink {
        KinesisSinkBuilder::new(OutputConfig::new("events").sink_config())
            .client(client)
            .build()
            .unwrap()
    }

    fn request() -> PutRecordRequest {
        PutRecordRequest {
            data: Bytes::from("hello"),
            partition_key: "100-h1".to_string(),
            stream_name: "events".to_string(),
        }
    }

    #[tokio::test]
    async fn test_kinesis_stream_client() {
        let rule = mock!(aws_sdk_kinesis::Client::put_record)
            .match_requests(|inp| {
                inp.stream_name() == Some("events") && inp.partition_key() == Some("100-h1")
            })
            .then_output(|| {
                PutRecordOutput::builder()
                    .shard_id("shardId-000000000002")
                    .sequence_number("42")
                    .build()
                    .unwrap()
            });
        let mut sink = sink_with(mock_client!(aws_sdk_kinesis, RuleMode::MatchAny, [&rule]));

        let response = StreamClient::put_record(&mut sink, request()).await.unwrap();
        assert_eq!(response.shard_id, "shardId-000000000002");
        assert_eq!(response.sequence_number, "42");
    }

    #[tokio::test]
    async fn test_kinesis_stream_client_error() {
        let rule = mock!(aws_sdk_kinesis::Client::put_record).then_error(|| {
            PutRecordError::generic(
                ErrorMetadata::builder()
                    .code("ResourceNotFoundException")
                    .message("Stream events under account 123456789012 not found.")
                    .build(),
            )
        });
        let mut sink = sink_with(mock_client!(aws_sdk_kinesis, RuleMode::MatchAny, [&rule]));

        let err = StreamClient::put_record(&mut sink, request())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Sink(msg) if msg.contains("ResourceNotFoundException")));
    }
}
