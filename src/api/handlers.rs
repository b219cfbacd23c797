use alloy::primitives::B256;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use std::str::FromStr;
use std::sync::Arc;

use super::types::*;
use super::AppState;
use crate::chain::Lookup;
use crate::history::NormalizedTransaction;
use crate::payroll::{PayrollBatch, PayrollEntry};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn api_error(status: StatusCode, msg: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: msg.into(),
        }),
    )
}

fn parse_tx_hash(hex: &str) -> Result<B256, (StatusCode, Json<ErrorResponse>)> {
    B256::from_str(hex)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Invalid transaction hash: {}", e)))
}

// ============================================================
// Health
// ============================================================

pub async fn health(State(state): State<Arc<AppState>>) -> ApiResult<HealthResponse> {
    let health = state.health.state().await;
    Ok(Json(HealthResponse {
        rpc_healthy: health.healthy,
        last_checked: health.last_checked,
        error: health.last_error,
    }))
}

// ============================================================
// History
// ============================================================

pub async fn history(State(state): State<Arc<AppState>>) -> ApiResult<HistoryResponse> {
    let snapshot = state.cache.snapshot().await;
    Ok(Json(HistoryResponse::from_snapshot(snapshot, &state.chain)))
}

pub async fn refresh_history(State(state): State<Arc<AppState>>) -> ApiResult<HistoryResponse> {
    state.cache.refresh().await;
    let snapshot = state.cache.snapshot().await;
    Ok(Json(HistoryResponse::from_snapshot(snapshot, &state.chain)))
}

// ============================================================
// Transactions
// ============================================================

pub async fn transaction(
    State(state): State<Arc<AppState>>,
    Path(tx_hash): Path<String>,
) -> ApiResult<NormalizedTransaction> {
    let hash = parse_tx_hash(&tx_hash)?;
    match state.cache.get_by_hash(hash).await {
        Lookup::Found(tx) => Ok(Json(tx)),
        Lookup::Missing => Err(api_error(
            StatusCode::NOT_FOUND,
            format!("No payroll batch found for transaction {}", tx_hash),
        )),
        Lookup::Failed(e) => Err(api_error(StatusCode::BAD_GATEWAY, e)),
    }
}

pub async fn transaction_status(
    State(state): State<Arc<AppState>>,
    Path(tx_hash): Path<String>,
) -> ApiResult<StatusResponse> {
    let hash = parse_tx_hash(&tx_hash)?;
    let status = state.cache.transaction_status(hash).await;
    Ok(Json(StatusResponse {
        tx_hash: bytes_to_hex(hash.as_slice()),
        status,
    }))
}

// ============================================================
// Payroll
// ============================================================

pub async fn payroll_calldata(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CalldataRequest>,
) -> ApiResult<CalldataResponse> {
    let entries: Vec<PayrollEntry> = request.entries.into_iter().map(PayrollEntry::from).collect();
    let batch = PayrollBatch::build(&entries, state.chain.token_decimals)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let payroll_contract = state
        .chain
        .payroll_address()
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let token_contract = state
        .chain
        .token_address()
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(CalldataResponse {
        token_contract,
        payroll_contract,
        recipients: batch.len(),
        total_crypto_amount: batch.total_crypto_amount().to_string(),
        approve: bytes_to_hex(&batch.approve_calldata(payroll_contract)),
        execute: bytes_to_hex(&batch.execute_calldata()),
    }))
}
