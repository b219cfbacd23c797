use alloy::primitives::{Address, B256};
use alloy::sol_types::SolEvent;

use crate::chain::{ChainReader, Lookup};

use super::events::{BatchDetailsEvent, BatchSummaryEvent, PayrollBatchDetails, PayrollBatchSent};
use super::merge::assemble;
use super::resolver::Resolution;
use super::types::NormalizedTransaction;

/// Rebuild a single batch from its transaction receipt.
///
/// Returns `Missing` when the transaction has no receipt or block yet, or
/// when its logs do not contain both a summary and matching details event
/// from `contract`.
pub async fn lookup_transaction(
    chain: &dyn ChainReader,
    contract: Address,
    tx_hash: B256,
    token_decimals: u8,
) -> Lookup<NormalizedTransaction> {
    let receipt = match chain.transaction_receipt(tx_hash).await {
        Ok(Some(receipt)) => receipt,
        Ok(None) => return Lookup::Missing,
        Err(e) => {
            tracing::warn!(tx = %tx_hash, error = %e, "Failed to get receipt");
            return Lookup::Failed(e.to_string());
        }
    };

    let Some(block_number) = receipt.block_number else {
        tracing::debug!(tx = %tx_hash, "Receipt has no block number yet");
        return Lookup::Missing;
    };

    let block = match chain.block(block_number).await {
        Ok(Some(block)) => block,
        Ok(None) => return Lookup::Missing,
        Err(e) => {
            tracing::warn!(tx = %tx_hash, block = block_number, error = %e, "Failed to get block");
            return Lookup::Failed(e.to_string());
        }
    };

    let contract_logs: Vec<_> = receipt
        .logs
        .iter()
        .filter(|log| log.address == contract)
        .collect();

    let Some(summary) = contract_logs
        .iter()
        .filter(|log| log.data.topics().first() == Some(&PayrollBatchSent::SIGNATURE_HASH))
        .find_map(|log| BatchSummaryEvent::from_log_data(&log.data, tx_hash, block_number).ok())
    else {
        tracing::debug!(tx = %tx_hash, "Transaction has no payroll batch event");
        return Lookup::Missing;
    };

    let Some(details) = contract_logs
        .iter()
        .filter(|log| log.data.topics().first() == Some(&PayrollBatchDetails::SIGNATURE_HASH))
        .filter_map(|log| BatchDetailsEvent::from_log_data(&log.data).ok())
        .find(|details| details.batch_id == summary.batch_id)
    else {
        tracing::debug!(tx = %tx_hash, batch = %summary.batch_id, "Transaction has no matching batch details");
        return Lookup::Missing;
    };

    let resolution = Resolution {
        receipt: Lookup::Found(receipt),
        block: Lookup::Found(block),
    };
    Lookup::Found(assemble(&summary, &details, &resolution, token_decimals))
}
