use serde::Serialize;
use std::fmt;

/// A fiat payout destination, carried on-chain as `bankCode:accountNumber`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    pub bank_code: String,
    pub account_number: String,
}

impl BankAccount {
    pub fn new(bank_code: impl Into<String>, account_number: impl Into<String>) -> Self {
        Self {
            bank_code: bank_code.into(),
            account_number: account_number.into(),
        }
    }

    /// Split on the first `:`. Returns `None` when there is no separator.
    pub fn parse(value: &str) -> Option<Self> {
        let (bank_code, account_number) = value.split_once(':')?;
        Some(Self::new(bank_code, account_number))
    }
}

impl fmt::Display for BankAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.bank_code, self.account_number)
    }
}
