//! Chord Core Library
//!
//! Fungible-unit ledger with a self-tapering transfer fee:
//! - every transfer burns a fee that steps up as burn progresses through an epoch
//! - each completed epoch mints part of its quota back to non-exempt holders
//! - after the last epoch transfers are fee-free for good

pub mod account;
pub mod allowance;
pub mod amount;
pub mod balances;
pub mod config;
pub mod epoch;
pub mod error;
pub mod exemption;
pub mod fee_curve;
pub mod ledger;

pub use account::{Address, Holding};
pub use amount::Amount;
pub use config::LedgerConfig;
pub use epoch::{EpochLedger, Redistribution};
pub use error::{LedgerError, Result};
pub use ledger::{Ledger, LedgerStats, TransferReceipt};

/// Basis points in one whole.
pub const BPS_DENOMINATOR: u32 = 10_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_constants() {
        assert_eq!(BPS_DENOMINATOR, 10_000);
        assert_eq!(config::DEFAULT_SYMBOL, "CHORD");
    }
}
