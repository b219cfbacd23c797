use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ChainConfig;
use crate::health::is_rpc_outage;
use crate::history::{CachePhase, CacheSnapshot, NormalizedTransaction, TxStatus};
use crate::payroll::{BankAccount, PayrollEntry};

// ============================================================
// Hex helpers
// ============================================================

pub fn bytes_to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// First eight characters of the payroll id followed by an ellipsis.
pub fn short_id(id: &[u8]) -> String {
    let hex = bytes_to_hex(id);
    let end = hex.len().min(8);
    format!("{}...", &hex[..end])
}

// ============================================================
// Response types
// ============================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub rpc_healthy: Option<bool>,
    pub last_checked: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub tx_hash: String,
    pub status: TxStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub phase: CachePhase,
    pub address: Option<Address>,
    pub last_updated: Option<DateTime<Utc>>,
    pub error: Option<String>,
    /// The error looks like an RPC outage; clients show a dismissible banner.
    pub rpc_outage: bool,
    pub transactions: Vec<TransactionRow>,
}

impl HistoryResponse {
    pub fn from_snapshot(snapshot: CacheSnapshot, chain: &ChainConfig) -> Self {
        let rpc_outage = snapshot.error.as_deref().is_some_and(is_rpc_outage);
        Self {
            phase: snapshot.phase,
            address: snapshot.address,
            last_updated: snapshot.last_updated,
            error: snapshot.error,
            rpc_outage,
            transactions: snapshot
                .transactions
                .iter()
                .map(|tx| TransactionRow::from_transaction(tx, chain))
                .collect(),
        }
    }
}

/// One row of the history table.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRow {
    pub tx_id: String,
    pub payroll_id: String,
    pub employee: String,
    pub amount_transfer: String,
    pub currency: String,
    pub local_currency: String,
    pub total_fiat_amount: String,
    pub status: TxStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub bank_account_name: String,
    pub bank_account: String,
    pub tx_hash: String,
    pub block_number: u64,
    pub block_explorer_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<u128>,
    pub explorer_url: Option<String>,
    pub lines: Vec<PaymentLine>,
}

/// One employee's payment within a batch.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentLine {
    pub employee: Address,
    pub explorer_url: Option<String>,
    pub crypto_amount: String,
    pub fiat_amount: String,
    pub currency: String,
    pub bank_account: Option<BankAccount>,
}

impl TransactionRow {
    pub fn from_transaction(tx: &NormalizedTransaction, chain: &ChainConfig) -> Self {
        let tx_hash = bytes_to_hex(tx.tx_hash.as_slice());
        let employee = match tx.employees.len() {
            0 => "No employees".to_string(),
            n => format!("{} employees", n),
        };

        let lines = tx
            .employees
            .iter()
            .enumerate()
            .map(|(i, employee)| PaymentLine {
                employee: *employee,
                explorer_url: chain.explorer_address_url(&employee.to_string()),
                crypto_amount: tx.crypto_amounts.get(i).cloned().unwrap_or_default(),
                fiat_amount: tx.fiat_amounts.get(i).cloned().unwrap_or_default(),
                currency: tx.currencies.get(i).cloned().unwrap_or_default(),
                bank_account: tx.bank_accounts.get(i).and_then(|raw| BankAccount::parse(raw)),
            })
            .collect();

        Self {
            tx_id: short_id(tx.payroll_id.as_slice()),
            payroll_id: bytes_to_hex(tx.payroll_id.as_slice()),
            employee,
            amount_transfer: tx.total_crypto_amount.clone(),
            currency: "USDC".to_string(),
            local_currency: tx.currencies.first().cloned().unwrap_or_else(|| "IDR".to_string()),
            total_fiat_amount: tx.total_fiat_amount.clone(),
            status: tx.status,
            created_at: i64::try_from(tx.timestamp)
                .ok()
                .and_then(|secs| DateTime::from_timestamp(secs, 0)),
            bank_account_name: "Batch Transfer".to_string(),
            bank_account: format!("{} accounts", tx.total_recipients),
            explorer_url: chain.explorer_tx_url(&tx_hash),
            tx_hash,
            block_number: tx.block_number,
            block_explorer_url: chain.explorer_block_url(tx.block_number),
            gas_used: tx.gas_used,
            gas_price: tx.gas_price,
            lines,
        }
    }
}

// ============================================================
// Payroll calldata
// ============================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollEntryRequest {
    pub employee: Address,
    pub crypto_amount: String,
    pub fiat_amount: String,
    pub currency: String,
    pub bank_code: String,
    pub account_number: String,
}

impl From<PayrollEntryRequest> for PayrollEntry {
    fn from(request: PayrollEntryRequest) -> Self {
        Self {
            employee: request.employee,
            crypto_amount: request.crypto_amount,
            fiat_amount: request.fiat_amount,
            currency: request.currency,
            bank: BankAccount::new(request.bank_code.trim(), request.account_number.trim()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CalldataRequest {
    pub entries: Vec<PayrollEntryRequest>,
}

/// Unsigned calls the owner's wallet submits, in order: `approve` on the
/// token, then `execute` on the payroll contract.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalldataResponse {
    pub token_contract: Address,
    pub payroll_contract: Address,
    pub recipients: usize,
    pub total_crypto_amount: String,
    pub approve: String,
    pub execute: String,
}
