use alloy::network::ReceiptResponse;
use alloy::primitives::{Address, B256};
use alloy::providers::Provider;
use alloy::rpc::types::{BlockNumberOrTag, Filter, Log};
use async_trait::async_trait;
use std::time::Duration;

use super::{BlockInfo, ChainReader, EventKind, ReceiptInfo};

/// [`ChainReader`] backed by an alloy provider.
pub struct RpcChain<P> {
    provider: P,
    contract: Address,
    max_retries: u32,
}

impl<P: Provider> RpcChain<P> {
    pub fn new(provider: P, contract: Address, max_retries: u32) -> Self {
        Self {
            provider,
            contract,
            max_retries,
        }
    }
}

#[async_trait]
impl<P: Provider> ChainReader for RpcChain<P> {
    async fn block_number(&self) -> eyre::Result<u64> {
        retry_rpc(self.max_retries, || async { self.provider.get_block_number().await }).await
    }

    async fn contract_logs(
        &self,
        kind: EventKind,
        from_block: u64,
        to_block: u64,
    ) -> eyre::Result<Vec<Log>> {
        let filter = Filter::new()
            .address(self.contract)
            .event_signature(kind.signature_hash())
            .from_block(from_block)
            .to_block(to_block);

        retry_rpc(self.max_retries, || self.provider.get_logs(&filter)).await
    }

    async fn transaction_receipt(&self, tx_hash: B256) -> eyre::Result<Option<ReceiptInfo>> {
        let receipt = retry_rpc(self.max_retries, || async {
            self.provider.get_transaction_receipt(tx_hash).await
        })
        .await?;

        Ok(receipt.map(|receipt| ReceiptInfo {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            success: receipt.status(),
            gas_used: receipt.gas_used,
            effective_gas_price: receipt.effective_gas_price,
            logs: receipt.inner.logs().iter().map(|log| log.inner.clone()).collect(),
        }))
    }

    async fn block(&self, number: u64) -> eyre::Result<Option<BlockInfo>> {
        let block = retry_rpc(self.max_retries, || async {
            self.provider
                .get_block_by_number(BlockNumberOrTag::Number(number))
                .await
        })
        .await?;

        Ok(block.map(|block| BlockInfo {
            number: block.header.number,
            timestamp: block.header.timestamp,
        }))
    }
}

/// Retry an async operation with exponential backoff, making at most
/// `max_retries + 1` attempts.
pub async fn retry_rpc<F, Fut, T, E>(max_retries: u32, mut f: F) -> eyre::Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delay = Duration::from_millis(500);

    for attempt in 0..max_retries {
        match f().await {
            Ok(val) => return Ok(val),
            Err(e) => {
                tracing::warn!(
                    attempt = attempt + 1,
                    max_retries,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "RPC call failed, retrying..."
                );
                tokio::time::sleep(delay).await;
                delay = std::cmp::min(delay * 2, Duration::from_secs(30));
            }
        }
    }

    f().await.map_err(|e| {
        if max_retries == 0 {
            eyre::eyre!("RPC call failed: {}", e)
        } else {
            eyre::eyre!("RPC call failed after {} retries: {}", max_retries, e)
        }
    })
}
