use alloy::primitives::B256;
use std::cmp::Reverse;
use std::collections::HashMap;

use crate::chain::ChainReader;

use super::events::{format_fiat_amount, format_token_amount, BatchDetailsEvent, BatchSummaryEvent};
use super::resolver::{self, Resolution};
use super::types::NormalizedTransaction;

/// Index details events by batch id. A later event for the same batch
/// replaces an earlier one.
pub fn build_details_map(details: &[BatchDetailsEvent]) -> HashMap<B256, &BatchDetailsEvent> {
    let mut map = HashMap::with_capacity(details.len());
    for event in details {
        if map.insert(event.batch_id, event).is_some() {
            tracing::debug!(batch = %event.batch_id, "Duplicate batch details, keeping the later event");
        }
    }
    map
}

/// Correlate summaries with their line items and receipts.
///
/// Summaries without a details event are dropped. Receipts are resolved one
/// summary at a time. The result is ordered newest first; records with equal
/// timestamps keep their input order.
pub async fn merge(
    chain: &dyn ChainReader,
    summaries: &[BatchSummaryEvent],
    details: &[BatchDetailsEvent],
    token_decimals: u8,
) -> Vec<NormalizedTransaction> {
    let details_map = build_details_map(details);
    let mut transactions = Vec::with_capacity(summaries.len().min(details_map.len()));

    for summary in summaries {
        let Some(details) = details_map.get(&summary.batch_id) else {
            tracing::debug!(
                batch = %summary.batch_id,
                tx = %summary.tx_hash,
                "No details for batch, skipping"
            );
            continue;
        };

        let resolution = resolver::resolve(chain, summary.tx_hash).await;
        transactions.push(assemble(summary, details, &resolution, token_decimals));
    }

    sort_newest_first(&mut transactions);
    transactions
}

/// Build the display record for one matched batch.
pub fn assemble(
    summary: &BatchSummaryEvent,
    details: &BatchDetailsEvent,
    resolution: &Resolution,
    token_decimals: u8,
) -> NormalizedTransaction {
    let receipt = resolution.receipt();

    NormalizedTransaction {
        payroll_id: summary.batch_id,
        tx_hash: summary.tx_hash,
        block_number: summary.block_number,
        timestamp: resolution.block_timestamp().unwrap_or(summary.timestamp),
        total_recipients: summary.total_recipients,
        total_crypto_amount: format_token_amount(summary.total_crypto_amount, token_decimals),
        total_fiat_amount: format_fiat_amount(summary.total_fiat_amount),
        employees: details.employees.clone(),
        crypto_amounts: details
            .crypto_amounts
            .iter()
            .map(|amount| format_token_amount(*amount, token_decimals))
            .collect(),
        fiat_amounts: details.fiat_amounts.iter().copied().map(format_fiat_amount).collect(),
        currencies: details.currencies.clone(),
        bank_accounts: details.bank_accounts.clone(),
        status: resolution.status(),
        gas_used: receipt.map(|r| r.gas_used),
        gas_price: receipt.map(|r| r.effective_gas_price),
    }
}

pub fn sort_newest_first(transactions: &mut [NormalizedTransaction]) {
    // sort_by_key is stable
    transactions.sort_by_key(|tx| Reverse(tx.timestamp));
}
