pub mod handlers;
pub mod types;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tokio_util::sync::CancellationToken;

use crate::config::ChainConfig;
use crate::health::RpcHealth;
use crate::history::HistoryCache;

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<HistoryCache>,
    pub health: Arc<RpcHealth>,
    pub chain: ChainConfig,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(handlers::health))
        .route("/api/v1/history", get(handlers::history))
        .route("/api/v1/history/refresh", post(handlers::refresh_history))
        .route("/api/v1/tx/{tx_hash}", get(handlers::transaction))
        .route("/api/v1/tx/{tx_hash}/status", get(handlers::transaction_status))
        .route("/api/v1/payroll/calldata", post(handlers::payroll_calldata))
        .with_state(Arc::new(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(
    state: AppState,
    host: &str,
    port: u16,
    shutdown: CancellationToken,
) -> eyre::Result<()> {
    let app = router(state);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    Ok(())
}
