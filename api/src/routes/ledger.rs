//! Ledger query, transfer and allowance endpoints

use crate::routes::parse_address;
use crate::{ApiResult, ApiState};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chord_core::{Amount, LedgerStats, TransferReceipt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Register ledger routes
pub fn ledger_routes() -> Router<ApiState> {
    Router::new()
        .route("/info", get(get_info))
        .route("/fee", get(get_fee))
        .route("/balance/{address}", get(get_balance))
        .route("/allowance/{owner}/{spender}", get(get_allowance))
        .route("/transfer", post(transfer))
        .route("/approve", post(approve))
        .route("/transfer_from", post(transfer_from))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeeResponse {
    pub current_fee_bps: u32,
    pub current_epoch: u32,
    pub total_epochs: u32,
    pub fee_floor_bps: u32,
    pub fee_ceiling_bps: u32,
    pub fee_step_bps: u32,
    pub lifetime_burn: Amount,
    pub epoch_burn_quota: Amount,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub address: String,
    pub balance: Amount,
    pub balance_display: String,
    pub excluded: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AllowanceResponse {
    pub owner: String,
    pub spender: String,
    pub allowance: Amount,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub from: String,
    pub to: String,
    pub amount: Amount,
}

#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub owner: String,
    pub spender: String,
    pub amount: Amount,
}

#[derive(Debug, Deserialize)]
pub struct TransferFromRequest {
    pub spender: String,
    pub owner: String,
    pub to: String,
    pub amount: Amount,
}

async fn get_info(State(state): State<ApiState>) -> Json<LedgerStats> {
    let ledger = state.ledger.read().await;
    Json(ledger.stats())
}

async fn get_fee(State(state): State<ApiState>) -> Json<FeeResponse> {
    let ledger = state.ledger.read().await;
    Json(FeeResponse {
        current_fee_bps: ledger.current_fee_bps(),
        current_epoch: ledger.current_epoch(),
        total_epochs: ledger.total_epochs(),
        fee_floor_bps: ledger.fee_floor_bps(),
        fee_ceiling_bps: ledger.fee_ceiling_bps(),
        fee_step_bps: ledger.fee_step_bps(),
        lifetime_burn: ledger.total_burn(),
        epoch_burn_quota: ledger.epoch_burn_quota(),
    })
}

async fn get_balance(
    State(state): State<ApiState>,
    Path(address): Path<String>,
) -> ApiResult<Json<BalanceResponse>> {
    let account = parse_address(&address)?;
    let ledger = state.ledger.read().await;
    let balance = ledger.balance_of(&account);

    Ok(Json(BalanceResponse {
        address,
        balance,
        balance_display: balance.display(ledger.decimals()),
        excluded: ledger.is_excluded(&account),
    }))
}

async fn get_allowance(
    State(state): State<ApiState>,
    Path((owner, spender)): Path<(String, String)>,
) -> ApiResult<Json<AllowanceResponse>> {
    let owner_address = parse_address(&owner)?;
    let spender_address = parse_address(&spender)?;
    let ledger = state.ledger.read().await;

    Ok(Json(AllowanceResponse {
        allowance: ledger.allowance(&owner_address, &spender_address),
        owner,
        spender,
    }))
}

async fn transfer(
    State(state): State<ApiState>,
    Json(request): Json<TransferRequest>,
) -> ApiResult<Json<TransferReceipt>> {
    let from = parse_address(&request.from)?;
    let to = parse_address(&request.to)?;

    let receipt = state
        .mutate(|ledger| ledger.transfer(&from, &to, request.amount))
        .await
        .inspect_err(|e| warn!("transfer {} -> {} rejected: {}", from, to, e))?;

    info!(
        "transfer {} -> {}: {} (fee {})",
        from, to, receipt.amount, receipt.gross_fee
    );
    Ok(Json(receipt))
}

async fn approve(
    State(state): State<ApiState>,
    Json(request): Json<ApproveRequest>,
) -> ApiResult<Json<AllowanceResponse>> {
    let owner = parse_address(&request.owner)?;
    let spender = parse_address(&request.spender)?;

    let allowance = state
        .mutate(|ledger| {
            ledger.approve(&owner, &spender, request.amount);
            Ok(ledger.allowance(&owner, &spender))
        })
        .await?;

    Ok(Json(AllowanceResponse {
        owner: request.owner,
        spender: request.spender,
        allowance,
    }))
}

async fn transfer_from(
    State(state): State<ApiState>,
    Json(request): Json<TransferFromRequest>,
) -> ApiResult<Json<TransferReceipt>> {
    let spender = parse_address(&request.spender)?;
    let owner = parse_address(&request.owner)?;
    let to = parse_address(&request.to)?;

    let receipt = state
        .mutate(|ledger| ledger.transfer_from(&spender, &owner, &to, request.amount))
        .await
        .inspect_err(|e| warn!("transfer_from by {} rejected: {}", spender, e))?;

    info!(
        "transfer_from {} on behalf of {} -> {}: {}",
        spender, owner, to, receipt.amount
    );
    Ok(Json(receipt))
}
