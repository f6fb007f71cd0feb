//! API routes organization
//!
//! - `ledger` - supply, fee curve, balances, transfers and allowances
//! - `exemptions` - administrator-only exemption toggles

mod exemptions;
mod ledger;

use crate::{ApiError, ApiResult, ApiState};
use axum::{extract::State, routing::get, Json, Router};
use chord_core::Address;
use serde::Serialize;

const MAX_ADDRESS_LEN: usize = 128;

/// Create the main router with all API endpoints
pub fn create_routes() -> Router<ApiState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/ledger", ledger::ledger_routes())
        .nest("/exemptions", exemptions::exemption_routes())
}

async fn root() -> &'static str {
    "Chord Ledger API"
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    uptime_secs: u64,
}

async fn health_check(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// Reject empty, oversized, or whitespace-bearing addresses.
pub(crate) fn parse_address(raw: &str) -> ApiResult<Address> {
    if raw.is_empty() || raw.len() > MAX_ADDRESS_LEN || raw.chars().any(char::is_whitespace) {
        return Err(ApiError::InvalidAddress(raw.to_string()));
    }
    Ok(Address::from(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        assert!(parse_address("alice").is_ok());
        assert!(parse_address("").is_err());
        assert!(parse_address("has space").is_err());
        assert!(parse_address(&"x".repeat(MAX_ADDRESS_LEN + 1)).is_err());
    }
}
