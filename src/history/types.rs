use alloy::primitives::{Address, B256};
use serde::Serialize;

use super::status::TxStatus;

/// One payroll batch as shown in the history: summary totals merged with
/// line items and the receipt outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTransaction {
    pub payroll_id: B256,
    pub tx_hash: B256,
    pub block_number: u64,
    /// Unix seconds; the block timestamp when known, else the contract's.
    pub timestamp: u64,
    pub total_recipients: u64,
    pub total_crypto_amount: String,
    pub total_fiat_amount: String,
    pub employees: Vec<Address>,
    pub crypto_amounts: Vec<String>,
    pub fiat_amounts: Vec<String>,
    pub currencies: Vec<String>,
    pub bank_accounts: Vec<String>,
    pub status: TxStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<u128>,
}

impl NormalizedTransaction {
    pub fn is_pending(&self) -> bool {
        self.status == TxStatus::Pending
    }
}
