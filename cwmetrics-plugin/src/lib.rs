use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use cwmetrics_common::{ErrorResponse, Report};
use std::net::SocketAddr;
use tracing::{debug, warn};

pub mod builders;
pub mod channel;
pub mod config;
pub mod plugin;

pub use channel::{StatsChannel, STATS_EVENT};
pub use plugin::{init, ReportingPlugin};

#[derive(Clone)]
pub struct AppState {
    pub channel: StatsChannel,
}

impl AppState {
    pub fn new(channel: StatsChannel) -> Self {
        Self { channel }
    }
}

/// Ingest server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub address: SocketAddr,
}

/// HTTP surface that accepts reports from a test runner and publishes them on the stats channel
pub struct Server {
    config: ServerConfig,
    channel: StatsChannel,
}

impl Server {
    /// Create a new server publishing to `channel`
    pub fn new(config: ServerConfig, channel: StatsChannel) -> Self {
        Self { config, channel }
    }

    /// Get the server's configured address
    pub fn address(&self) -> SocketAddr {
        self.config.address
    }

    /// Create the application router with the given state
    pub fn create_router(state: AppState) -> Router {
        Router::new()
            .route("/stats", post(handle_stats))
            .route("/health", get(handle_health))
            .with_state(state)
    }

    /// Run the server, signalling `ready_tx` with the bound address once accepting connections
    pub async fn run(self, ready_tx: tokio::sync::oneshot::Sender<SocketAddr>) -> Result<(), Box<dyn std::error::Error>> {
        let app = Self::create_router(AppState::new(self.channel));
        let listener = tokio::net::TcpListener::bind(self.config.address).await?;
        let local_addr = listener.local_addr()?;
        ready_tx.send(local_addr).ok();
        axum::serve(listener, app).await?;
        Ok(())
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { error: message.into() })).into_response()
}

/// Handler for POST /stats — parses a report and publishes it; 202 once published, 400 on bad JSON.
pub async fn handle_stats(State(state): State<AppState>, body: Bytes) -> Response {
    let report: Report = match serde_json::from_slice(&body) {
        Ok(report) => report,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, format!("Invalid report: {}", e)),
    };

    let delivered = state.channel.publish(report);
    if delivered == 0 {
        warn!(event = state.channel.name(), "Report published with no subscribers");
    } else {
        debug!(event = state.channel.name(), delivered, "Report published");
    }

    StatusCode::ACCEPTED.into_response()
}

/// Handler for GET /health
pub async fn handle_health() -> StatusCode {
    StatusCode::OK
}
