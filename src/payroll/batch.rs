use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use bigdecimal::num_bigint::BigInt;
use bigdecimal::BigDecimal;
use std::str::FromStr;
use thiserror::Error;

use super::bank::BankAccount;

sol! {
    interface IOriginPayroll {
        function executePayrollBatch(
            address[] employees,
            uint256[] cryptoAmounts,
            uint256[] fiatAmounts,
            string[] currencies,
            string[] bankAccounts
        ) external payable;
    }

    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayrollError {
    #[error("payroll batch has no employees")]
    Empty,
    #[error("employee {index}: address must not be zero")]
    ZeroAddress { index: usize },
    #[error("employee {index}: invalid crypto amount '{value}'")]
    InvalidCryptoAmount { index: usize, value: String },
    #[error("employee {index}: crypto amount must be greater than zero")]
    ZeroCryptoAmount { index: usize },
    #[error("employee {index}: invalid fiat amount '{value}', expected a whole number")]
    InvalidFiatAmount { index: usize, value: String },
    #[error("employee {index}: currency is required")]
    MissingCurrency { index: usize },
    #[error("employee {index}: bank code and account number are required")]
    InvalidBankAccount { index: usize },
    #[error("employee {index}: batch crypto total exceeds uint256")]
    AmountOverflow { index: usize },
}

/// One employee's payment as entered by the payroll owner.
#[derive(Debug, Clone)]
pub struct PayrollEntry {
    pub employee: Address,
    /// Token amount as a decimal string, e.g. `"12.5"`.
    pub crypto_amount: String,
    /// Fiat amount as a whole number in the currency's smallest display unit.
    pub fiat_amount: String,
    pub currency: String,
    pub bank: BankAccount,
}

/// Validated arguments for `executePayrollBatch`.
#[derive(Debug, Clone, PartialEq)]
pub struct PayrollBatch {
    pub employees: Vec<Address>,
    pub crypto_amounts: Vec<U256>,
    pub fiat_amounts: Vec<U256>,
    pub currencies: Vec<String>,
    pub bank_accounts: Vec<String>,
    total_crypto_amount: U256,
}

impl PayrollBatch {
    pub fn build(entries: &[PayrollEntry], token_decimals: u8) -> Result<Self, PayrollError> {
        if entries.is_empty() {
            return Err(PayrollError::Empty);
        }

        let mut batch = Self {
            employees: Vec::with_capacity(entries.len()),
            crypto_amounts: Vec::with_capacity(entries.len()),
            fiat_amounts: Vec::with_capacity(entries.len()),
            currencies: Vec::with_capacity(entries.len()),
            bank_accounts: Vec::with_capacity(entries.len()),
            total_crypto_amount: U256::ZERO,
        };

        for (index, entry) in entries.iter().enumerate() {
            if entry.employee == Address::ZERO {
                return Err(PayrollError::ZeroAddress { index });
            }

            let crypto = parse_token_amount(&entry.crypto_amount, token_decimals).ok_or_else(|| {
                PayrollError::InvalidCryptoAmount {
                    index,
                    value: entry.crypto_amount.clone(),
                }
            })?;
            if crypto.is_zero() {
                return Err(PayrollError::ZeroCryptoAmount { index });
            }
            batch.total_crypto_amount = batch
                .total_crypto_amount
                .checked_add(crypto)
                .ok_or(PayrollError::AmountOverflow { index })?;

            let fiat = parse_whole_number(&entry.fiat_amount).ok_or_else(|| {
                PayrollError::InvalidFiatAmount {
                    index,
                    value: entry.fiat_amount.clone(),
                }
            })?;

            if entry.currency.trim().is_empty() {
                return Err(PayrollError::MissingCurrency { index });
            }

            let bank = &entry.bank;
            if bank.bank_code.is_empty() || bank.bank_code.contains(':') || bank.account_number.is_empty() {
                return Err(PayrollError::InvalidBankAccount { index });
            }

            batch.employees.push(entry.employee);
            batch.crypto_amounts.push(crypto);
            batch.fiat_amounts.push(fiat);
            batch.currencies.push(entry.currency.trim().to_string());
            batch.bank_accounts.push(bank.to_string());
        }

        Ok(batch)
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    /// Token units the payroll contract must be approved to spend.
    pub fn total_crypto_amount(&self) -> U256 {
        self.total_crypto_amount
    }

    /// Calldata for the token approval that must precede execution.
    pub fn approve_calldata(&self, payroll_contract: Address) -> Bytes {
        IERC20::approveCall {
            spender: payroll_contract,
            amount: self.total_crypto_amount(),
        }
        .abi_encode()
        .into()
    }

    pub fn execute_calldata(&self) -> Bytes {
        IOriginPayroll::executePayrollBatchCall {
            employees: self.employees.clone(),
            cryptoAmounts: self.crypto_amounts.clone(),
            fiatAmounts: self.fiat_amounts.clone(),
            currencies: self.currencies.clone(),
            bankAccounts: self.bank_accounts.clone(),
        }
        .abi_encode()
        .into()
    }
}

/// Parse a decimal token amount into integer units. Returns `None` for
/// negative values or more fractional digits than `decimals`.
pub fn parse_token_amount(value: &str, decimals: u8) -> Option<U256> {
    let amount = BigDecimal::from_str(value.trim()).ok()?;
    if amount < BigDecimal::from(0i64) {
        return None;
    }

    let scaled = amount * BigDecimal::new(BigInt::from(1), -i64::from(decimals));
    if !scaled.is_integer() {
        return None;
    }

    let (units, _) = scaled.with_scale(0).into_bigint_and_exponent();
    U256::from_str(&units.to_string()).ok()
}

fn parse_whole_number(value: &str) -> Option<U256> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    U256::from_str(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: u8, crypto: &str, fiat: &str) -> PayrollEntry {
        PayrollEntry {
            employee: Address::with_last_byte(n),
            crypto_amount: crypto.to_string(),
            fiat_amount: fiat.to_string(),
            currency: "IDR".to_string(),
            bank: BankAccount::new("BCA", format!("12345{}", n)),
        }
    }

    #[test]
    fn test_parse_token_amount() {
        assert_eq!(parse_token_amount("1.5", 6), Some(U256::from(1_500_000u64)));
        assert_eq!(parse_token_amount("2", 6), Some(U256::from(2_000_000u64)));
        assert_eq!(parse_token_amount("0.000001", 6), Some(U256::from(1u64)));
        assert_eq!(parse_token_amount("0.0000001", 6), None);
        assert_eq!(parse_token_amount("-1", 6), None);
        assert_eq!(parse_token_amount("abc", 6), None);
    }

    #[test]
    fn test_build_batch() {
        let batch = PayrollBatch::build(&[entry(1, "1.5", "24600"), entry(2, "2", "32800")], 6).unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.crypto_amounts, vec![U256::from(1_500_000u64), U256::from(2_000_000u64)]);
        assert_eq!(batch.fiat_amounts[1], U256::from(32_800u64));
        assert_eq!(batch.bank_accounts, vec!["BCA:123451".to_string(), "BCA:123452".to_string()]);
        assert_eq!(batch.total_crypto_amount(), U256::from(3_500_000u64));
    }

    #[test]
    fn test_build_rejects_bad_entries() {
        assert_eq!(PayrollBatch::build(&[], 6), Err(PayrollError::Empty));
        assert_eq!(
            PayrollBatch::build(&[entry(1, "1", "10"), entry(2, "0", "10")], 6),
            Err(PayrollError::ZeroCryptoAmount { index: 1 })
        );
        assert_eq!(
            PayrollBatch::build(&[entry(1, "1", "10.5")], 6),
            Err(PayrollError::InvalidFiatAmount {
                index: 0,
                value: "10.5".to_string()
            })
        );

        let mut no_bank = entry(1, "1", "10");
        no_bank.bank = BankAccount::new("BCA", "");
        assert_eq!(
            PayrollBatch::build(&[no_bank], 6),
            Err(PayrollError::InvalidBankAccount { index: 0 })
        );

        let mut zero = entry(1, "1", "10");
        zero.employee = Address::ZERO;
        assert_eq!(PayrollBatch::build(&[zero], 6), Err(PayrollError::ZeroAddress { index: 0 }));
    }

    #[test]
    fn test_build_rejects_total_overflow() {
        // 2^255 units each; two of them no longer fit in a uint256
        let half = "57896044618658097711785492504343953926634992332820282019728792003956564819968";
        let one = PayrollBatch::build(&[entry(1, half, "1")], 0).unwrap();
        assert_eq!(one.total_crypto_amount(), U256::from(2u64).pow(U256::from(255u64)));

        assert_eq!(
            PayrollBatch::build(&[entry(1, half, "1"), entry(2, half, "1"), entry(3, half, "1")], 0),
            Err(PayrollError::AmountOverflow { index: 1 })
        );
        assert_eq!(
            PayrollBatch::build(&[entry(1, "1", "1"), entry(2, &U256::MAX.to_string(), "1")], 0),
            Err(PayrollError::AmountOverflow { index: 1 })
        );
    }

    #[test]
    fn test_calldata() {
        let batch = PayrollBatch::build(&[entry(1, "1.5", "24600"), entry(2, "2", "32800")], 6).unwrap();
        let payroll = Address::with_last_byte(0x99);

        let approve = batch.approve_calldata(payroll);
        assert_eq!(approve[..4], IERC20::approveCall::SELECTOR);
        let decoded = IERC20::approveCall::abi_decode(&approve).unwrap();
        assert_eq!(decoded.spender, payroll);
        assert_eq!(decoded.amount, U256::from(3_500_000u64));

        let execute = batch.execute_calldata();
        assert_eq!(execute[..4], IOriginPayroll::executePayrollBatchCall::SELECTOR);
        let decoded = IOriginPayroll::executePayrollBatchCall::abi_decode(&execute).unwrap();
        assert_eq!(decoded.employees, batch.employees);
        assert_eq!(decoded.bankAccounts, batch.bank_accounts);
    }
}
