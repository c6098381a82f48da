/// Longest partition key, in Unicode characters, that Kinesis accepts.
pub const MAX_PARTITION_KEY_CHARS: usize = 256;

/// Derives the partition key of a record as `<timestamp>-<hostname>`.
///
/// The key only drives shard placement, so it needs to be cheap and deterministic, not unique.
/// An empty hostname still yields `<timestamp>-`. The key is not truncated: with a nanosecond
/// timestamp, a hostname longer than about 235 characters exceeds [MAX_PARTITION_KEY_CHARS] and
/// every put from that host is rejected by the service.
pub fn partition_key(timestamp: i64, hostname: &str) -> String {
    format!("{timestamp}-{hostname}")
}

/// Returns true when Kinesis accepts `key` as a partition key.
pub fn is_valid_partition_key(key: &str) -> bool {
    (1..=MAX_PARTITION_KEY_CHARS).contains(&key.chars().count())
}
