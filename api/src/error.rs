//! API Error Handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chord_core::LedgerError;
use chord_storage::StorageError;
use serde_json::json;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::InvalidAddress(_) => (StatusCode::BAD_REQUEST, "invalid_address"),
            ApiError::Ledger(err) => match err {
                LedgerError::InvalidAmount(_) => (StatusCode::BAD_REQUEST, "invalid_amount"),
                LedgerError::InsufficientBalance { .. } => {
                    (StatusCode::BAD_REQUEST, "insufficient_balance")
                }
                LedgerError::InsufficientAllowance { .. } => {
                    (StatusCode::BAD_REQUEST, "insufficient_allowance")
                }
                LedgerError::AlreadyExcluded(_) => (StatusCode::CONFLICT, "already_excluded"),
                LedgerError::AlreadyIncluded(_) => (StatusCode::CONFLICT, "already_included"),
                LedgerError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
                LedgerError::ConfigurationInvalid(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "configuration_invalid")
                }
                LedgerError::ArithmeticOverflow(_) => {
                    (StatusCode::BAD_REQUEST, "arithmetic_overflow")
                }
            },
            ApiError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_kind();
        let body = Json(json!({
            "error": error_type,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chord_core::Address;

    #[test]
    fn test_status_mapping() {
        let err = ApiError::from(LedgerError::Unauthorized(Address::from("mallory")));
        assert_eq!(err.status_and_kind(), (StatusCode::UNAUTHORIZED, "unauthorized"));

        let err = ApiError::from(LedgerError::AlreadyExcluded(Address::from("pool")));
        assert_eq!(err.status_and_kind().0, StatusCode::CONFLICT);

        let err = ApiError::InvalidAddress(String::new());
        assert_eq!(err.status_and_kind().0, StatusCode::BAD_REQUEST);
    }
}
