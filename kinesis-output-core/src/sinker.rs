use kinesis_stream::sink::{PutRecordRequest, PutRecordResponse};

use crate::Result;

/// [StreamClient] over the Kinesis `PutRecord` API.
mod kinesis;

#[cfg(test)]
pub(crate) mod test_utils;

/// Puts one record on the stream service per call.
///
/// No batching or retries: the result of the single round trip is returned to the caller.
#[trait_variant::make(StreamClient: Send)]
#[allow(dead_code, async_fn_in_trait)]
pub trait LocalStreamClient {
    async fn put_record(&mut self, request: PutRecordRequest) -> Result<PutRecordResponse>;
}
