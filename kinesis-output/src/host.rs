//! Minimal host pipeline: every non-empty line on the reader becomes one record.
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use kinesis_output_core::partition::{
    MAX_PARTITION_KEY_CHARS, is_valid_partition_key, partition_key,
};
use kinesis_output_core::{InboundRecord, Release};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// System hostname stamped on every record, empty when it is not valid UTF-8.
pub(crate) fn hostname() -> String {
    gethostname::gethostname()
        .into_string()
        .unwrap_or_default()
}

/// Checks once that keys derived from `hostname` fit the Kinesis partition key limit.
pub(crate) fn check_hostname(hostname: &str) -> bool {
    let key = partition_key(now_nanos(), hostname);
    let valid = is_valid_partition_key(&key);
    if !valid {
        warn!(
            hostname,
            max_chars = MAX_PARTITION_KEY_CHARS,
            "Hostname is too long for a partition key, every record will be rejected by Kinesis"
        );
    }
    valid
}

fn now_nanos() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or_default()
}

/// Counts records released back to the host.
#[derive(Clone, Default)]
pub(crate) struct Reclaimed {
    delivered: Arc<AtomicU64>,
    failed: Arc<AtomicU64>,
}

impl Reclaimed {
    #[cfg(test)]
    fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    #[cfg(test)]
    fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Waits for the release of one record without blocking the reader.
    fn watch(&self, timestamp: i64, release: oneshot::Receiver<Release>) {
        let counters = self.clone();
        tokio::spawn(async move {
            match release.await {
                Ok(Release::Delivered) => {
                    counters.delivered.fetch_add(1, Ordering::Relaxed);
                }
                Ok(Release::Failed) => {
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                    warn!(timestamp, "Record was dropped by the Kinesis output");
                }
                Err(_) => warn!(timestamp, "Release handle dropped without notification"),
            }
        });
    }
}

/// Sends one record per non-empty line until EOF, `shutdown` resolves, or the output stops.
///
/// Dropping `tx` on return closes the inbound channel, which stops the output stage.
pub(crate) async fn feed_lines<R, F>(
    reader: R,
    hostname: &str,
    tx: mpsc::Sender<InboundRecord>,
    reclaimed: Reclaimed,
    shutdown: F,
) -> std::io::Result<u64>
where
    R: AsyncBufRead + Unpin,
    F: Future<Output = ()>,
{
    let mut lines = reader.lines();
    let mut sent = 0;
    tokio::pin!(shutdown);

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = &mut shutdown => break,
        };
        let Some(line) = line else {
            debug!("Reached end of input");
            break;
        };
        if line.is_empty() {
            continue;
        }

        let timestamp = now_nanos();
        let (record, release) = InboundRecord::new(line, timestamp, hostname);
        if tx.send(record).await.is_err() {
            warn!("Kinesis output stopped, no longer reading input");
            break;
        }
        reclaimed.watch(timestamp, release);
        sent += 1;
    }

    Ok(sent)
}
