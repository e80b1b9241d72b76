//! Conclave panel entry point.
//!
//! Host lines arrive on stdin, outbound intents leave on stdout as JSON lines,
//! logs go to stderr.

use conclave_panel::runtime::{bootstrap, serve};
use std::io::BufReader;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let config = bootstrap()?;
    tracing::info!(
        state_dir = %config.persistence.state_dir.display(),
        coordinator_role = %config.reconcile.coordinator_role,
        "Starting conclave panel"
    );

    serve(&config, BufReader::new(std::io::stdin()), std::io::stdout()).await?;

    tracing::info!("Conclave panel stopped");
    Ok(())
}
