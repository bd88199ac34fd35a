//! Campaign Board — campaign management service.
//!
//! Main entry point that loads configuration and starts the server.

use campaign_api::ApiServer;
use campaign_core::config::{AppConfig, MAX_SESSION_TTL_HOURS};
use clap::Parser;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "campaign-board")]
#[command(about = "Campaign management service with owner-gated CRUD")]
#[command(version)]
struct Cli {
    /// Node identifier (overrides config)
    #[arg(long, env = "CAMPAIGN_BOARD__NODE_ID")]
    node_id: Option<String>,

    /// Bind address (overrides config)
    #[arg(long, env = "CAMPAIGN_BOARD__API__HOST")]
    host: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "CAMPAIGN_BOARD__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Session lifetime in hours (overrides config)
    #[arg(
        long,
        env = "CAMPAIGN_BOARD__SESSION__TTL_HOURS",
        value_parser = clap::value_parser!(i64).range(1..=MAX_SESSION_TTL_HOURS)
    )]
    session_ttl_hours: Option<i64>,

    /// Do not start the Prometheus exporter
    #[arg(long, default_value_t = false)]
    no_metrics: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "campaign_board=info,campaign_management=info,campaign_api=info,tower_http=info"
                    .into()
            }),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Campaign Board starting up");

    // Load configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(host) = cli.host {
        config.api.host = host;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(ttl) = cli.session_ttl_hours {
        config.session.ttl_hours = ttl;
    }
    if cli.no_metrics {
        config.metrics.enabled = false;
    }

    info!(
        node_id = %config.node_id,
        http_port = config.api.http_port,
        session_ttl_hours = config.session.ttl_hours,
        "Configuration loaded"
    );

    let api_server = ApiServer::new(config)?;

    // Start metrics exporter
    if let Err(e) = api_server.start_metrics() {
        error!(error = %e, "Failed to start metrics exporter");
    }

    info!("Campaign Board is ready to serve traffic");

    // Start HTTP server (blocks until shutdown)
    api_server.start_http().await?;

    Ok(())
}
