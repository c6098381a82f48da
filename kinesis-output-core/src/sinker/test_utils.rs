use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use kinesis_stream::sink::{PutRecordRequest, PutRecordResponse};

use crate::Result;
use crate::delivery::{ErrorReporter, Stage};
use crate::encoder::Encoder;
use crate::error::Error;
use crate::record::InboundRecord;
use crate::sinker::StreamClient;

/// Records every put request and fails the ones whose partition key is listed.
#[derive(Clone, Default)]
pub(crate) struct RecordingClient {
    pub(crate) requests: Arc<Mutex<Vec<PutRecordRequest>>>,
    fail_keys: HashSet<String>,
}

impl RecordingClient {
    pub(crate) fn failing_on(keys: &[&str]) -> Self {
        Self {
            requests: Default::default(),
            fail_keys: keys.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub(crate) fn requests(&self) -> Vec<PutRecordRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl StreamClient for RecordingClient {
    async fn put_record(&mut self, request: PutRecordRequest) -> Result<PutRecordResponse> {
        let fail = self.fail_keys.contains(&request.partition_key);
        let mut requests = self.requests.lock().unwrap();
        requests.push(request);
        if fail {
            return Err(Error::Sink(
                "ProvisionedThroughputExceededException: Rate exceeded".to_string(),
            ));
        }
        Ok(PutRecordResponse {
            shard_id: "shardId-000000000000".to_string(),
            sequence_number: requests.len().to_string(),
        })
    }
}

/// Prefixes the payload with `enc:`, failing on payloads equal to `bad`.
pub(crate) struct PrefixEncoder;

impl Encoder for PrefixEncoder {
    fn encode(&self, record: &InboundRecord) -> Result<Bytes> {
        if record.payload().as_ref() == b"bad" {
            return Err(Error::Encode("malformed record".to_string()));
        }
        let mut out = b"enc:".to_vec();
        out.extend_from_slice(record.payload());
        Ok(out.into())
    }
}

/// Collects every reported failure.
#[derive(Clone, Default)]
pub(crate) struct CollectingReporter {
    pub(crate) reports: Arc<Mutex<Vec<(Stage, i64, Error)>>>,
}

impl CollectingReporter {
    pub(crate) fn reports(&self) -> Vec<(Stage, i64, Error)> {
        self.reports.lock().unwrap().clone()
    }
}

impl ErrorReporter for CollectingReporter {
    fn report(&self, stage: Stage, record: &InboundRecord, error: &Error) {
        self.reports
            .lock()
            .unwrap()
            .push((stage, record.timestamp(), error.clone()));
    }
}
