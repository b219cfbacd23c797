use alloy::primitives::Address;

use crate::chain::{ChainReader, EventKind};
use crate::config::HistoryConfig;

use super::events::{decode_details_log, decode_summary_log, BatchDetailsEvent, BatchSummaryEvent};

/// Inclusive block range an event query covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    pub from: u64,
    pub to: u64,
}

/// Decoded payroll events for one block range.
#[derive(Debug, Clone, PartialEq)]
pub struct EventBatch {
    pub range: BlockRange,
    pub summaries: Vec<BatchSummaryEvent>,
    pub details: Vec<BatchDetailsEvent>,
    /// The node did not report its height; the fallback height was used.
    pub tip_degraded: bool,
    /// The details query failed and `details` is empty.
    pub details_degraded: bool,
}

/// Resolve the block range to scan.
///
/// A failed height lookup falls back to `fallback_block_height`. The start
/// defaults to `lookback_blocks` below the tip.
pub async fn resolve_range(
    chain: &dyn ChainReader,
    settings: &HistoryConfig,
    from_block: Option<u64>,
    to_block: Option<u64>,
) -> (BlockRange, bool) {
    let (tip, degraded) = match chain.block_number().await {
        Ok(tip) => (tip, false),
        Err(e) => {
            tracing::warn!(
                error = %e,
                fallback = settings.fallback_block_height,
                "Failed to get current block number, using fallback"
            );
            (settings.fallback_block_height, true)
        }
    };

    let to = to_block.unwrap_or(tip);
    let from = from_block.unwrap_or_else(|| tip.saturating_sub(settings.lookback_blocks));
    (BlockRange { from, to }, degraded)
}

/// Query both payroll event kinds and decode them.
///
/// Fails only when the summary query fails; a failed details query yields an
/// empty details list. Logs that do not decode are dropped individually.
pub async fn fetch_events(
    chain: &dyn ChainReader,
    settings: &HistoryConfig,
    owner: Address,
    from_block: Option<u64>,
    to_block: Option<u64>,
) -> eyre::Result<EventBatch> {
    let (range, tip_degraded) = resolve_range(chain, settings, from_block, to_block).await;

    tracing::info!(
        owner = %owner,
        from = range.from,
        to = range.to,
        "Fetching payroll events"
    );

    let summary_logs = chain
        .contract_logs(EventKind::BatchSent, range.from, range.to)
        .await
        .map_err(|e| eyre::eyre!("Failed to fetch PayrollBatchSent events: {}", e))?;

    let (detail_logs, details_degraded) =
        match chain.contract_logs(EventKind::BatchDetails, range.from, range.to).await {
            Ok(logs) => (logs, false),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch PayrollBatchDetails events, continuing without");
                (Vec::new(), true)
            }
        };

    let summaries: Vec<_> = summary_logs
        .iter()
        .filter_map(|log| match decode_summary_log(log) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!(tx = ?log.transaction_hash, error = %e, "Skipping batch sent event");
                None
            }
        })
        .collect();

    let details: Vec<_> = detail_logs
        .iter()
        .filter_map(|log| match decode_details_log(log) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!(tx = ?log.transaction_hash, error = %e, "Skipping batch details event");
                None
            }
        })
        .collect();

    tracing::debug!(
        summaries = summaries.len(),
        details = details.len(),
        "Decoded payroll events"
    );

    Ok(EventBatch {
        range,
        summaries,
        details,
        tip_degraded,
        details_degraded,
    })
}
