//! Exemption endpoints

use crate::routes::parse_address;
use crate::{ApiResult, ApiState};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chord_core::Amount;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Register exemption routes
pub fn exemption_routes() -> Router<ApiState> {
    Router::new()
        .route("/", get(list_excluded))
        .route("/{address}", get(get_exemption))
        .route("/exclude", post(exclude))
        .route("/include", post(include))
}

/// Exemption toggle request; `caller` must be the administrator.
#[derive(Debug, Deserialize)]
pub struct ExemptionRequest {
    pub caller: String,
    pub account: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExemptionResponse {
    pub account: String,
    pub excluded: bool,
    pub balance: Amount,
}

async fn list_excluded(State(state): State<ApiState>) -> Json<Vec<String>> {
    let ledger = state.ledger.read().await;
    Json(
        ledger
            .excluded_accounts()
            .into_iter()
            .map(|address| address.to_string())
            .collect(),
    )
}

async fn get_exemption(
    State(state): State<ApiState>,
    Path(address): Path<String>,
) -> ApiResult<Json<ExemptionResponse>> {
    let account = parse_address(&address)?;
    let ledger = state.ledger.read().await;

    Ok(Json(ExemptionResponse {
        excluded: ledger.is_excluded(&account),
        balance: ledger.balance_of(&account),
        account: address,
    }))
}

async fn exclude(
    State(state): State<ApiState>,
    Json(request): Json<ExemptionRequest>,
) -> ApiResult<Json<ExemptionResponse>> {
    let caller = parse_address(&request.caller)?;
    let account = parse_address(&request.account)?;

    let balance = state
        .mutate(|ledger| ledger.exclude(&caller, &account))
        .await
        .inspect_err(|e| warn!("exclude {} by {} rejected: {}", account, caller, e))?;

    info!("excluded {} at balance {}", account, balance);
    Ok(Json(ExemptionResponse {
        account: request.account,
        excluded: true,
        balance,
    }))
}

async fn include(
    State(state): State<ApiState>,
    Json(request): Json<ExemptionRequest>,
) -> ApiResult<Json<ExemptionResponse>> {
    let caller = parse_address(&request.caller)?;
    let account = parse_address(&request.account)?;

    let balance = state
        .mutate(|ledger| ledger.include(&caller, &account))
        .await
        .inspect_err(|e| warn!("include {} by {} rejected: {}", account, caller, e))?;

    info!("included {} at balance {}", account, balance);
    Ok(Json(ExemptionResponse {
        account: request.account,
        excluded: false,
        balance,
    }))
}
