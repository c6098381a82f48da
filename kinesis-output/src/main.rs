use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use kinesis_output_core::{JsonEncoder, OutputBuilder, OutputConfig};
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

mod host;
mod setup_tracing;

/// Number of records the host may queue ahead of the delivery loop.
const INBOUND_CHANNEL_CAPACITY: usize = 500;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    setup_tracing::register();

    if let Err(e) = run().await {
        error!("{e:?}");
        return Err(e);
    }
    info!("Exiting...");

    Ok(())
}

async fn run() -> Result<(), Box<dyn Error>> {
    // config file from the first argument, falling back to CONFIG_PATH; environment only otherwise
    let config_path = env::args()
        .nth(1)
        .or_else(|| env::var("CONFIG_PATH").ok())
        .map(PathBuf::from);

    let config = OutputConfig::load(config_path.as_deref())?;
    let output = OutputBuilder::new(config)
        .encoder(Arc::new(JsonEncoder))
        .build()?;

    let (tx, rx) = mpsc::channel(INBOUND_CHANNEL_CAPACITY);
    let output_handle = tokio::spawn(output.run(rx));

    let hostname = host::hostname();
    host::check_hostname(&hostname);
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(?e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received, closing inbound channel");
    };

    let sent = host::feed_lines(
        BufReader::new(tokio::io::stdin()),
        &hostname,
        tx,
        host::Reclaimed::default(),
        shutdown,
    )
    .await?;

    let stats = output_handle.await?;
    info!(
        sent,
        delivered = stats.delivered,
        failed = stats.failed,
        "Kinesis output finished"
    );
    Ok(())
}
