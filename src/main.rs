use clap::Parser;
use tokio::net::TcpListener;

use relay_proxy::config::{loader, ProxyConfig};
use relay_proxy::http::HttpServer;
use relay_proxy::observability::logging;

#[derive(Parser)]
#[command(name = "relay-proxy")]
#[command(about = "Single-backend HTTP reverse proxy", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => loader::load_config(path)?,
        None => ProxyConfig::default(),
    };

    logging::init(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        origin = %config.upstream.origin,
        "configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "listening for connections");

    let server = HttpServer::new(config)?;
    server.run(listener).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
