//! In-memory chain and log builders shared by unit tests.

use alloy::primitives::{address, Address, Log as PrimitiveLog, LogData, B256, U256};
use alloy::rpc::types::Log;
use alloy::sol_types::SolEvent;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::chain::{BlockInfo, ChainReader, EventKind, ReceiptInfo};
use crate::history::events::{PayrollBatchDetails, PayrollBatchSent};

pub const PAYROLL_CONTRACT: Address = address!("0x63719d58c13abadad02d5390c7f83082f51de805");

pub fn batch_id(n: u8) -> B256 {
    B256::with_last_byte(n)
}

pub fn tx_hash(n: u8) -> B256 {
    let mut bytes = [0u8; 32];
    bytes[0] = 0xAA;
    bytes[31] = n;
    B256::from(bytes)
}

pub fn employee(n: u8) -> Address {
    Address::with_last_byte(n)
}

pub fn summary_data(id: B256, recipients: u64, crypto: u64, fiat: u64, timestamp: u64) -> LogData {
    PayrollBatchSent {
        payrollId: id,
        totalRecipients: U256::from(recipients),
        totalCryptoAmount: U256::from(crypto),
        totalFiatAmount: U256::from(fiat),
        timestamp: U256::from(timestamp),
    }
    .encode_log_data()
}

/// Details with `count` employees, each paid 1 token (1_000_000 units) and
/// 16_400 IDR, with bank accounts `BCA:100000000{i}`.
pub fn details_data(id: B256, count: usize) -> LogData {
    details_data_with(id, count, 1_000_000)
}

pub fn details_data_with(id: B256, count: usize, crypto_each: u64) -> LogData {
    PayrollBatchDetails {
        payrollId: id,
        employees: (0..count).map(|i| employee(i as u8 + 1)).collect(),
        cryptoAmounts: vec![U256::from(crypto_each); count],
        fiatAmounts: vec![U256::from(16_400u64); count],
        currencies: vec!["IDR".to_string(); count],
        bankAccounts: (0..count).map(|i| format!("BCA:100000000{}", i)).collect(),
    }
    .encode_log_data()
}

pub fn rpc_log(data: LogData, tx_hash: B256, block_number: u64) -> Log {
    Log {
        inner: PrimitiveLog {
            address: PAYROLL_CONTRACT,
            data,
        },
        transaction_hash: Some(tx_hash),
        block_number: Some(block_number),
        ..Default::default()
    }
}

pub fn summary_log(
    id: B256,
    recipients: u64,
    crypto: u64,
    fiat: u64,
    timestamp: u64,
    tx_hash: B256,
    block_number: u64,
) -> Log {
    rpc_log(summary_data(id, recipients, crypto, fiat, timestamp), tx_hash, block_number)
}

pub fn details_log(id: B256, count: usize, tx_hash: B256, block_number: u64) -> Log {
    rpc_log(details_data(id, count), tx_hash, block_number)
}

pub fn receipt(tx_hash: B256, block_number: u64, success: bool) -> ReceiptInfo {
    ReceiptInfo {
        tx_hash,
        block_number: Some(block_number),
        success,
        gas_used: 210_000,
        effective_gas_price: 1_000_000_000,
        logs: Vec::new(),
    }
}

#[derive(Default)]
struct FakeState {
    tip: Option<u64>,
    summary_logs: Option<Vec<Log>>,
    details_logs: Option<Vec<Log>>,
    receipts: HashMap<B256, ReceiptInfo>,
    failing_receipts: HashSet<B256>,
    blocks: HashMap<u64, BlockInfo>,
    failing_blocks: HashSet<u64>,
    log_queries: Vec<(EventKind, u64, u64)>,
    receipt_queries: Vec<B256>,
    summary_gate: Option<Arc<Notify>>,
}

/// Scriptable [`ChainReader`]. Unset tip or event lists behave as RPC failures.
#[derive(Default)]
pub struct FakeChain {
    state: Mutex<FakeState>,
}

impl FakeChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tip(self, tip: u64) -> Self {
        self.state.lock().unwrap().tip = Some(tip);
        self
    }

    pub fn with_summaries(self, logs: Vec<Log>) -> Self {
        self.state.lock().unwrap().summary_logs = Some(logs);
        self
    }

    pub fn with_details(self, logs: Vec<Log>) -> Self {
        self.state.lock().unwrap().details_logs = Some(logs);
        self
    }

    pub fn with_receipt(self, receipt: ReceiptInfo) -> Self {
        self.set_receipt(receipt);
        self
    }

    pub fn with_failing_receipt(self, tx_hash: B256) -> Self {
        self.state.lock().unwrap().failing_receipts.insert(tx_hash);
        self
    }

    pub fn with_block(self, number: u64, timestamp: u64) -> Self {
        self.state
            .lock()
            .unwrap()
            .blocks
            .insert(number, BlockInfo { number, timestamp });
        self
    }

    pub fn with_failing_block(self, number: u64) -> Self {
        self.state.lock().unwrap().failing_blocks.insert(number);
        self
    }

    pub fn set_receipt(&self, receipt: ReceiptInfo) {
        let mut state = self.state.lock().unwrap();
        state.failing_receipts.remove(&receipt.tx_hash);
        state.receipts.insert(receipt.tx_hash, receipt);
    }

    pub fn set_summaries(&self, logs: Option<Vec<Log>>) {
        self.state.lock().unwrap().summary_logs = logs;
    }

    pub fn set_details(&self, logs: Option<Vec<Log>>) {
        self.state.lock().unwrap().details_logs = logs;
    }

    /// Hold the next summary query until the returned gate is notified.
    /// Its logs are read after release, so they can be swapped meanwhile.
    pub fn gate_summaries(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state.lock().unwrap().summary_gate = Some(gate.clone());
        gate
    }

    pub fn set_tip(&self, tip: Option<u64>) {
        self.state.lock().unwrap().tip = tip;
    }

    pub fn log_queries(&self) -> Vec<(EventKind, u64, u64)> {
        self.state.lock().unwrap().log_queries.clone()
    }

    pub fn receipt_queries(&self) -> Vec<B256> {
        self.state.lock().unwrap().receipt_queries.clone()
    }
}

#[async_trait]
impl ChainReader for FakeChain {
    async fn block_number(&self) -> eyre::Result<u64> {
        self.state
            .lock()
            .unwrap()
            .tip
            .ok_or_else(|| eyre::eyre!("connection refused"))
    }

    async fn contract_logs(
        &self,
        kind: EventKind,
        from_block: u64,
        to_block: u64,
    ) -> eyre::Result<Vec<Log>> {
        let gate = {
            let mut state = self.state.lock().unwrap();
            state.log_queries.push((kind, from_block, to_block));
            match kind {
                EventKind::BatchSent => state.summary_gate.take(),
                EventKind::BatchDetails => None,
            }
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let state = self.state.lock().unwrap();
        let logs = match kind {
            EventKind::BatchSent => state.summary_logs.clone(),
            EventKind::BatchDetails => state.details_logs.clone(),
        };
        logs.ok_or_else(|| eyre::eyre!("{} query failed: 503 Service Unavailable", kind.as_str()))
    }

    async fn transaction_receipt(&self, tx_hash: B256) -> eyre::Result<Option<ReceiptInfo>> {
        let mut state = self.state.lock().unwrap();
        state.receipt_queries.push(tx_hash);
        if state.failing_receipts.contains(&tx_hash) {
            return Err(eyre::eyre!("request timed out"));
        }
        Ok(state.receipts.get(&tx_hash).cloned())
    }

    async fn block(&self, number: u64) -> eyre::Result<Option<BlockInfo>> {
        let state = self.state.lock().unwrap();
        if state.failing_blocks.contains(&number) {
            return Err(eyre::eyre!("request timed out"));
        }
        Ok(state.blocks.get(&number).copied())
    }
}
