//! API server — mounts the campaign board routes and operational probes.

use crate::rest::{self, AppState};
use axum::routing::get;
use axum::Router;
use campaign_core::config::AppConfig;
use campaign_core::CampaignResult;
use campaign_management::{management_router, ManagementState};
use std::net::SocketAddr;
use std::time::Instant;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Main API server for the campaign board.
pub struct ApiServer {
    config: AppConfig,
    management: ManagementState,
}

impl ApiServer {
    /// Fails when the session settings are out of range.
    pub fn new(config: AppConfig) -> CampaignResult<Self> {
        let management = ManagementState::new(&config.session)?;
        Ok(Self { config, management })
    }

    /// Shared state behind the campaign routes.
    pub fn management(&self) -> &ManagementState {
        &self.management
    }

    /// The full application router, without binding a socket.
    pub fn router(&self) -> Router {
        let state = AppState {
            node_id: self.config.node_id.clone(),
            start_time: Instant::now(),
        };

        let ops = Router::new()
            .route("/health", get(rest::health_check))
            .route("/ready", get(rest::readiness))
            .route("/live", get(rest::liveness))
            .with_state(state);

        Router::new()
            .merge(ops)
            .merge(management_router(self.management.clone()))
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
    }

    /// Start the HTTP server.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let app = self.router();

        let addr = SocketAddr::new(
            self.config.api.host.parse()?,
            self.config.api.http_port,
        );

        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Start the metrics exporter on a separate port.
    pub fn start_metrics(&self) -> anyhow::Result<()> {
        if !self.config.metrics.enabled {
            info!("Metrics exporter disabled");
            return Ok(());
        }

        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");
        Ok(())
    }
}
