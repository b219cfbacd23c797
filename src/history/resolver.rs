use alloy::primitives::B256;

use crate::chain::{BlockInfo, ChainReader, Lookup, ReceiptInfo};

use super::status::{derive_status, TxStatus};

/// Receipt and block for one transaction, each independently optional.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub receipt: Lookup<ReceiptInfo>,
    pub block: Lookup<BlockInfo>,
}

impl Resolution {
    pub fn receipt(&self) -> Option<&ReceiptInfo> {
        self.receipt.found()
    }

    pub fn block_timestamp(&self) -> Option<u64> {
        self.block.found().map(|block| block.timestamp)
    }

    pub fn status(&self) -> TxStatus {
        derive_status(self.receipt())
    }
}

/// Fetch the receipt for `tx_hash` and, when it names one, its block.
///
/// Never fails: RPC errors are logged and reported as `Lookup::Failed`, which
/// callers treat the same as a missing receipt or block.
pub async fn resolve(chain: &dyn ChainReader, tx_hash: B256) -> Resolution {
    let receipt = Lookup::from_result(chain.transaction_receipt(tx_hash).await);
    if let Lookup::Failed(ref e) = receipt {
        tracing::warn!(tx = %tx_hash, error = %e, "Failed to get receipt, treating as pending");
    }

    let block = match receipt.found().and_then(|receipt| receipt.block_number) {
        Some(number) => {
            let block = Lookup::from_result(chain.block(number).await);
            if let Lookup::Failed(ref e) = block {
                tracing::warn!(
                    tx = %tx_hash,
                    block = number,
                    error = %e,
                    "Failed to get block, using event timestamp"
                );
            }
            block
        }
        None => Lookup::Missing,
    };

    Resolution { receipt, block }
}

/// Receipt-only status check used when re-polling pending transactions.
pub async fn transaction_status(chain: &dyn ChainReader, tx_hash: B256) -> TxStatus {
    match chain.transaction_receipt(tx_hash).await {
        Ok(receipt) => derive_status(receipt.as_ref()),
        Err(e) => {
            tracing::warn!(tx = %tx_hash, error = %e, "Failed to get transaction status");
            TxStatus::Pending
        }
    }
}
