pub mod api;
pub mod chain;
pub mod config;
pub mod health;
pub mod history;
pub mod payroll;

#[cfg(test)]
pub(crate) mod testutil;
