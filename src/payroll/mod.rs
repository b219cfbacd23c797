//! Building the owner's payroll submission: token approval plus the batch
//! execution call. Signing and broadcasting are left to the wallet.

pub mod bank;
pub mod batch;

pub use bank::BankAccount;
pub use batch::{PayrollBatch, PayrollEntry, PayrollError};
