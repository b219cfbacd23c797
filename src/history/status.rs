use serde::Serialize;

use crate::chain::ReceiptInfo;

/// Execution state of a payroll transaction as seen by the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxStatus {
    Pending,
    Success,
    Failed,
}

impl TxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }

    /// SUCCESS and FAILED never change once observed.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for TxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn derive_status(receipt: Option<&ReceiptInfo>) -> TxStatus {
    match receipt {
        None => TxStatus::Pending,
        Some(receipt) if receipt.success => TxStatus::Success,
        Some(_) => TxStatus::Failed,
    }
}
