use alloy::providers::ProviderBuilder;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use payroll_history::api::{self, AppState};
use payroll_history::chain::rpc::RpcChain;
use payroll_history::chain::ChainReader;
use payroll_history::config::Config;
use payroll_history::health::{spawn_health_monitor, RpcHealth};
use payroll_history::history::cache::spawn_pending_poller;
use payroll_history::history::HistoryCache;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    // Initialize structured logging (set RUST_LOG=info for output)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    tracing::info!("Payroll history service starting");

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path)?;
    tracing::info!(
        chain = %config.chain.name,
        chain_id = config.chain.chain_id,
        contract = %config.chain.payroll_contract,
        "Configuration loaded from {}",
        config_path
    );

    let provider = ProviderBuilder::new().connect_http(
        config
            .chain
            .rpc_http
            .parse()
            .map_err(|e| eyre::eyre!("Invalid RPC URL: {}", e))?,
    );
    let chain: Arc<dyn ChainReader> = Arc::new(RpcChain::new(
        provider,
        config.chain.payroll_address()?,
        config.chain.rpc_max_retries,
    ));

    let health = Arc::new(RpcHealth::new());
    let cache = Arc::new(HistoryCache::new(
        chain.clone(),
        &config.chain,
        config.history.clone(),
    )?);

    // Initial load; an unreachable node leaves the cache empty with an error
    let owner = config.history.owner_address()?;
    match owner {
        Some(owner) => {
            let transactions = cache.fetch_full(Some(owner), None).await;
            tracing::info!(%owner, count = transactions.len(), "Initial history loaded");
        }
        None => tracing::warn!("No owner configured, history stays empty until one is set"),
    }

    let shutdown = CancellationToken::new();
    let mut handles = Vec::new();

    handles.push(spawn_pending_poller(
        cache.clone(),
        Duration::from_secs(config.history.pending_poll_secs),
        shutdown.clone(),
    ));
    handles.push(spawn_health_monitor(
        chain.clone(),
        health.clone(),
        Duration::from_secs(config.history.health_check_secs),
        shutdown.clone(),
    ));

    if config.api.enabled {
        let state = AppState {
            cache: cache.clone(),
            health: health.clone(),
            chain: config.chain.clone(),
        };
        let host = config.api.host.clone();
        let port = config.api.port;
        let shutdown = shutdown.clone();
        handles.push(tokio::spawn(async move {
            if let Err(e) = api::serve(state, &host, port, shutdown).await {
                tracing::error!(error = %e, "API server failed");
            }
        }));
    }

    tracing::info!("Payroll history service running. Press Ctrl+C to stop.");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received, stopping background tasks...");
    shutdown.cancel();

    for result in futures::future::join_all(handles).await {
        if let Err(e) = result {
            tracing::warn!(error = %e, "Background task ended abnormally");
        }
    }

    tracing::info!("Payroll history service stopped gracefully");
    Ok(())
}
