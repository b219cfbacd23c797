//! Read access to the payroll contract's chain.
//!
//! Everything above this module talks to the node through [`ChainReader`], so
//! the history pipeline can run against a live RPC endpoint or an in-memory
//! stand-in.

pub mod rpc;

use alloy::primitives::{Log as PrimitiveLog, B256};
use alloy::rpc::types::Log;
use alloy::sol_types::SolEvent;
use async_trait::async_trait;

use crate::history::events::{PayrollBatchDetails, PayrollBatchSent};

/// The two payroll events the history is rebuilt from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    BatchSent,
    BatchDetails,
}

impl EventKind {
    pub fn signature_hash(&self) -> B256 {
        match self {
            Self::BatchSent => PayrollBatchSent::SIGNATURE_HASH,
            Self::BatchDetails => PayrollBatchDetails::SIGNATURE_HASH,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BatchSent => "PayrollBatchSent",
            Self::BatchDetails => "PayrollBatchDetails",
        }
    }
}

/// The parts of a transaction receipt the history needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptInfo {
    pub tx_hash: B256,
    /// `None` when the node has not reported the including block.
    pub block_number: Option<u64>,
    /// Execution status code; `true` when the transaction succeeded.
    pub success: bool,
    pub gas_used: u64,
    pub effective_gas_price: u128,
    pub logs: Vec<PrimitiveLog>,
}

/// Minimal block info needed to timestamp a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    pub number: u64,
    pub timestamp: u64,
}

/// Read interface to the chain holding the payroll contract.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Current chain height.
    async fn block_number(&self) -> eyre::Result<u64>;

    /// Logs of one event kind emitted by the payroll contract in an inclusive
    /// block range, in the order the node returns them.
    async fn contract_logs(&self, kind: EventKind, from_block: u64, to_block: u64)
        -> eyre::Result<Vec<Log>>;

    async fn transaction_receipt(&self, tx_hash: B256) -> eyre::Result<Option<ReceiptInfo>>;

    async fn block(&self, number: u64) -> eyre::Result<Option<BlockInfo>>;
}

/// Outcome of a single network lookup that must not abort its caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    Missing,
    Failed(String),
}

impl<T> Lookup<T> {
    pub fn from_result(result: eyre::Result<Option<T>>) -> Self {
        match result {
            Ok(Some(value)) => Self::Found(value),
            Ok(None) => Self::Missing,
            Err(e) => Self::Failed(e.to_string()),
        }
    }

    pub fn found(&self) -> Option<&T> {
        match self {
            Self::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_from_result() {
        assert_eq!(Lookup::from_result(Ok(Some(7u64))), Lookup::Found(7));
        assert_eq!(Lookup::<u64>::from_result(Ok(None)), Lookup::Missing);

        let failed = Lookup::<u64>::from_result(Err(eyre::eyre!("connection refused")));
        assert!(failed.is_failed());
        assert_eq!(failed.found(), None);
        assert_eq!(failed, Lookup::Failed("connection refused".to_string()));
    }

    #[test]
    fn test_event_kinds_have_distinct_signatures() {
        assert_ne!(
            EventKind::BatchSent.signature_hash(),
            EventKind::BatchDetails.signature_hash()
        );
        assert_eq!(EventKind::BatchSent.as_str(), "PayrollBatchSent");
    }
}
