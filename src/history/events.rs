use alloy::primitives::{Address, LogData, B256, U256};
use alloy::rpc::types::Log;
use alloy::sol;
use alloy::sol_types::SolEvent;

// Payroll contract events. `payrollId` links a summary to its line items.
sol! {
    event PayrollBatchSent(
        bytes32 indexed payrollId,
        uint256 totalRecipients,
        uint256 totalCryptoAmount,
        uint256 totalFiatAmount,
        uint256 timestamp
    );

    event PayrollBatchDetails(
        bytes32 indexed payrollId,
        address[] employees,
        uint256[] cryptoAmounts,
        uint256[] fiatAmounts,
        string[] currencies,
        string[] bankAccounts
    );
}

/// Aggregate totals for one payroll batch, decoded from `PayrollBatchSent`.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummaryEvent {
    pub batch_id: B256,
    pub total_recipients: u64,
    /// Token units, not yet scaled by the token's decimals.
    pub total_crypto_amount: U256,
    pub total_fiat_amount: U256,
    /// Timestamp the contract recorded, in unix seconds.
    pub timestamp: u64,
    pub tx_hash: B256,
    pub block_number: u64,
}

/// Per-employee line items, decoded from `PayrollBatchDetails`.
///
/// The five lists always have the same length; index `i` across them
/// describes one employee's payment.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchDetailsEvent {
    pub batch_id: B256,
    pub employees: Vec<Address>,
    pub crypto_amounts: Vec<U256>,
    pub fiat_amounts: Vec<U256>,
    pub currencies: Vec<String>,
    /// `bankCode:accountNumber` strings.
    pub bank_accounts: Vec<String>,
}

impl BatchSummaryEvent {
    pub fn from_log_data(data: &LogData, tx_hash: B256, block_number: u64) -> eyre::Result<Self> {
        let event = PayrollBatchSent::decode_log_data(data)
            .map_err(|e| eyre::eyre!("Malformed PayrollBatchSent log: {}", e))?;

        Ok(Self {
            batch_id: event.payrollId,
            total_recipients: narrow_u64(event.totalRecipients, "totalRecipients")?,
            total_crypto_amount: event.totalCryptoAmount,
            total_fiat_amount: event.totalFiatAmount,
            timestamp: narrow_u64(event.timestamp, "timestamp")?,
            tx_hash,
            block_number,
        })
    }
}

impl BatchDetailsEvent {
    pub fn from_log_data(data: &LogData) -> eyre::Result<Self> {
        let event = PayrollBatchDetails::decode_log_data(data)
            .map_err(|e| eyre::eyre!("Malformed PayrollBatchDetails log: {}", e))?;

        let count = event.employees.len();
        let lengths = [
            event.cryptoAmounts.len(),
            event.fiatAmounts.len(),
            event.currencies.len(),
            event.bankAccounts.len(),
        ];
        if lengths.iter().any(|&len| len != count) {
            return Err(eyre::eyre!(
                "PayrollBatchDetails {} has misaligned line items: {} employees, lists of {:?}",
                event.payrollId,
                count,
                lengths
            ));
        }

        Ok(Self {
            batch_id: event.payrollId,
            employees: event.employees,
            crypto_amounts: event.cryptoAmounts,
            fiat_amounts: event.fiatAmounts,
            currencies: event.currencies,
            bank_accounts: event.bankAccounts,
        })
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }
}

/// Decode a `PayrollBatchSent` log returned by an event query.
pub fn decode_summary_log(log: &Log) -> eyre::Result<BatchSummaryEvent> {
    let tx_hash = log
        .transaction_hash
        .ok_or_else(|| eyre::eyre!("PayrollBatchSent log has no transaction hash"))?;
    let block_number = log.block_number.unwrap_or(0);

    BatchSummaryEvent::from_log_data(&log.inner.data, tx_hash, block_number)
}

/// Decode a `PayrollBatchDetails` log returned by an event query.
pub fn decode_details_log(log: &Log) -> eyre::Result<BatchDetailsEvent> {
    BatchDetailsEvent::from_log_data(&log.inner.data)
}

fn narrow_u64(value: U256, field: &str) -> eyre::Result<u64> {
    if value > U256::from(u64::MAX) {
        return Err(eyre::eyre!("{} does not fit in 64 bits: {}", field, value));
    }
    Ok(value.to::<u64>())
}

/// Render integer token units as a decimal string.
///
/// Trailing fractional zeros are trimmed but one fractional digit is always
/// kept, so `2_000_000` with 6 decimals renders as `"2.0"`.
pub fn format_token_amount(value: U256, decimals: u8) -> String {
    let base = U256::from(10u64).pow(U256::from(decimals));
    let whole = value / base;
    let fraction = value % base;

    let mut fraction_digits = format!("{:0>width$}", fraction.to_string(), width = decimals as usize);
    while fraction_digits.len() > 1 && fraction_digits.ends_with('0') {
        fraction_digits.pop();
    }
    if fraction_digits.is_empty() {
        fraction_digits.push('0');
    }

    format!("{}.{}", whole, fraction_digits)
}

/// Fiat amounts are carried as plain integers with no implied decimals.
pub fn format_fiat_amount(value: U256) -> String {
    value.to_string()
}
