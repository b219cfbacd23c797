use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::chain::ChainReader;

/// Lowercased fragments of errors that mean the RPC node is unreachable or
/// overloaded rather than that the request itself was wrong.
const OUTAGE_SIGNATURES: &[&str] = &[
    "connection refused",
    "connection reset",
    "error sending request",
    "timed out",
    "timeout",
    "dns error",
    "429",
    "too many requests",
    "502",
    "bad gateway",
    "503",
    "service unavailable",
    "504",
    "rate limit",
];

/// Whether an error message looks like an RPC outage.
pub fn is_rpc_outage(message: &str) -> bool {
    let message = message.to_lowercase();
    OUTAGE_SIGNATURES.iter().any(|sig| message.contains(sig))
}

#[derive(Debug, Clone, Default)]
pub struct HealthState {
    /// `None` until the first check completes.
    pub healthy: Option<bool>,
    pub last_checked: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Latest observation of whether the RPC node answers.
#[derive(Debug, Default)]
pub struct RpcHealth {
    state: RwLock<HealthState>,
}

impl RpcHealth {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn state(&self) -> HealthState {
        self.state.read().await.clone()
    }

    /// Probe the node with a block number call and record the outcome.
    pub async fn check(&self, chain: &dyn ChainReader) -> bool {
        let result = chain.block_number().await;
        let mut state = self.state.write().await;
        state.last_checked = Some(Utc::now());
        match result {
            Ok(block) => {
                tracing::debug!(block, "RPC health check passed");
                state.healthy = Some(true);
                state.last_error = None;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "RPC health check failed");
                state.healthy = Some(false);
                state.last_error = Some(e.to_string());
                false
            }
        }
    }
}

/// Re-check RPC health every `interval` until `shutdown` is cancelled.
pub fn spawn_health_monitor(
    chain: Arc<dyn ChainReader>,
    health: Arc<RpcHealth>,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            health.check(chain.as_ref()).await;

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown.cancelled() => {
                    tracing::info!("Shutdown received, stopping health monitor");
                    break;
                }
            }
        }
    })
}
