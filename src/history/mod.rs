//! Payroll history reconstruction: event fetch, receipt resolution, merge and
//! the in-memory cache served to the display layer.

pub mod cache;
pub mod events;
pub mod lookup;
pub mod merge;
pub mod resolver;
pub mod source;
pub mod status;
pub mod types;

pub use cache::{CachePhase, CacheSnapshot, HistoryCache};
pub use status::TxStatus;
pub use types::NormalizedTransaction;
