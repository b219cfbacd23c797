use alloy::primitives::{Address, B256};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::chain::{ChainReader, Lookup};
use crate::config::{ChainConfig, HistoryConfig};

use super::lookup::lookup_transaction;
use super::merge::merge;
use super::resolver::transaction_status;
use super::source::fetch_events;
use super::status::TxStatus;
use super::types::NormalizedTransaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CachePhase {
    Empty,
    Loading,
    Ready,
}

/// Point-in-time copy of the cache for readers.
#[derive(Debug, Clone)]
pub struct CacheSnapshot {
    pub phase: CachePhase,
    pub address: Option<Address>,
    pub transactions: Vec<NormalizedTransaction>,
    pub last_updated: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

#[derive(Debug)]
struct CacheState {
    phase: CachePhase,
    address: Option<Address>,
    transactions: Vec<NormalizedTransaction>,
    last_updated: Option<DateTime<Utc>>,
    error: Option<String>,
}

/// In-memory payroll history for one wallet.
///
/// `fetch_full`, `refresh` and `poll_pending` are serialized so a status
/// poll never patches a list that a refresh is about to replace. A failed
/// refresh keeps the previous transactions and only records the error.
pub struct HistoryCache {
    chain: Arc<dyn ChainReader>,
    contract: Address,
    token_decimals: u8,
    settings: HistoryConfig,
    state: RwLock<CacheState>,
    op_lock: Mutex<()>,
}

impl HistoryCache {
    pub fn new(
        chain: Arc<dyn ChainReader>,
        chain_config: &ChainConfig,
        settings: HistoryConfig,
    ) -> eyre::Result<Self> {
        Ok(Self {
            chain,
            contract: chain_config.payroll_address()?,
            token_decimals: chain_config.token_decimals,
            settings,
            state: RwLock::new(CacheState {
                phase: CachePhase::Empty,
                address: None,
                transactions: Vec::new(),
                last_updated: None,
                error: None,
            }),
            op_lock: Mutex::new(()),
        })
    }

    pub async fn snapshot(&self) -> CacheSnapshot {
        let state = self.state.read().await;
        CacheSnapshot {
            phase: state.phase,
            address: state.address,
            transactions: state.transactions.clone(),
            last_updated: state.last_updated,
            error: state.error.clone(),
        }
    }

    /// Rebuild the history for `address` and replace the held set.
    ///
    /// With no address the held set is cleared. If the events cannot be
    /// fetched an empty list is returned and the previous set is kept.
    pub async fn fetch_full(
        &self,
        address: Option<Address>,
        from_block: Option<u64>,
    ) -> Vec<NormalizedTransaction> {
        let _guard = self.op_lock.lock().await;
        self.fetch_full_locked(address, from_block).await
    }

    /// Re-run `fetch_full` for the last used address.
    pub async fn refresh(&self) -> Vec<NormalizedTransaction> {
        let _guard = self.op_lock.lock().await;
        let address = self.state.read().await.address;
        self.fetch_full_locked(address, None).await
    }

    async fn fetch_full_locked(
        &self,
        address: Option<Address>,
        from_block: Option<u64>,
    ) -> Vec<NormalizedTransaction> {
        let Some(owner) = address else {
            let mut state = self.state.write().await;
            state.address = None;
            state.transactions.clear();
            state.error = None;
            state.phase = CachePhase::Ready;
            return Vec::new();
        };

        let previous_phase = {
            let mut state = self.state.write().await;
            let previous = state.phase;
            if state.address != Some(owner) {
                state.transactions.clear();
                state.last_updated = None;
            }
            state.address = Some(owner);
            state.phase = CachePhase::Loading;
            state.error = None;
            previous
        };

        let batch = match fetch_events(self.chain.as_ref(), &self.settings, owner, from_block, None).await {
            Ok(batch) => batch,
            Err(e) => {
                tracing::error!(owner = %owner, error = %e, "Error fetching transaction history");
                let mut state = self.state.write().await;
                state.error = Some(e.to_string());
                state.phase = match previous_phase {
                    CachePhase::Empty if state.transactions.is_empty() => CachePhase::Empty,
                    _ => CachePhase::Ready,
                };
                return Vec::new();
            }
        };

        let transactions = merge(
            self.chain.as_ref(),
            &batch.summaries,
            &batch.details,
            self.token_decimals,
        )
        .await;

        tracing::info!(
            owner = %owner,
            from = batch.range.from,
            to = batch.range.to,
            summaries = batch.summaries.len(),
            details = batch.details.len(),
            transactions = transactions.len(),
            degraded = batch.tip_degraded || batch.details_degraded,
            "Transaction history loaded"
        );

        let mut state = self.state.write().await;
        state.transactions = transactions.clone();
        state.last_updated = Some(Utc::now());
        state.phase = CachePhase::Ready;
        transactions
    }

    /// Re-check every pending transaction and patch those that settled.
    /// Returns how many records changed.
    pub async fn poll_pending(&self) -> usize {
        let _guard = self.op_lock.lock().await;

        let pending: Vec<B256> = self
            .state
            .read()
            .await
            .transactions
            .iter()
            .filter(|tx| tx.is_pending())
            .map(|tx| tx.tx_hash)
            .collect();

        if pending.is_empty() {
            return 0;
        }

        let mut settled = Vec::new();
        for tx_hash in pending {
            let status = transaction_status(self.chain.as_ref(), tx_hash).await;
            if status != TxStatus::Pending {
                settled.push((tx_hash, status));
            }
        }

        if settled.is_empty() {
            return 0;
        }

        let mut state = self.state.write().await;
        let mut updated = 0;
        for (tx_hash, status) in settled {
            if let Some(tx) = state
                .transactions
                .iter_mut()
                .find(|tx| tx.tx_hash == tx_hash && tx.is_pending())
            {
                tracing::info!(tx = %tx_hash, status = %status, "Pending transaction settled");
                tx.status = status;
                updated += 1;
            }
        }
        if updated > 0 {
            state.last_updated = Some(Utc::now());
        }
        updated
    }

    /// Look up one transaction directly from the chain without touching the
    /// held set.
    pub async fn get_by_hash(&self, tx_hash: B256) -> Lookup<NormalizedTransaction> {
        lookup_transaction(self.chain.as_ref(), self.contract, tx_hash, self.token_decimals).await
    }

    pub async fn transaction_status(&self, tx_hash: B256) -> TxStatus {
        transaction_status(self.chain.as_ref(), tx_hash).await
    }
}

/// Run `poll_pending` every `interval` until `shutdown` is cancelled.
pub fn spawn_pending_poller(
    cache: Arc<HistoryCache>,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(interval_secs = interval.as_secs(), "Pending transaction poller active");
        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown.cancelled() => {
                    tracing::info!("Shutdown received, stopping pending poller");
                    break;
                }
            }

            let updated = cache.poll_pending().await;
            if updated > 0 {
                tracing::debug!(updated, "Pending poll updated transactions");
            }
        }
    })
}
