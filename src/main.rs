mod components;
mod config;
mod error;
mod server;
mod shutdown;
mod startup;

use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting mailcal");

    // Load configuration
    let config = startup::load_config()?;

    // Serve the inbound webhook
    startup::start_server(config).await
}
