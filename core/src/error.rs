//! Ledger error types

use thiserror::Error;

use crate::account::Address;
use crate::amount::Amount;

/// Errors raised by ledger operations.
///
/// Every error is detected before the ledger is mutated, so a failed call
/// leaves the state exactly as it was and is always safe to retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Amount, available: Amount },

    #[error("Insufficient allowance: requested {requested}, available {available}")]
    InsufficientAllowance { requested: Amount, available: Amount },

    #[error("Account {0} is already excluded")]
    AlreadyExcluded(Address),

    #[error("Account {0} is already included")]
    AlreadyIncluded(Address),

    #[error("Unauthorized caller: {0}")]
    Unauthorized(Address),

    #[error("Invalid configuration: {0}")]
    ConfigurationInvalid(String),

    #[error("Arithmetic overflow in {0}")]
    ArithmeticOverflow(&'static str),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
