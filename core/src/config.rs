//! Immutable ledger configuration

use serde::{Deserialize, Serialize};

use crate::account::Address;
use crate::amount::{Amount, MAX_DECIMAL_SCALE};
use crate::error::{LedgerError, Result};
use crate::BPS_DENOMINATOR;

pub const DEFAULT_NAME: &str = "Chord";
pub const DEFAULT_SYMBOL: &str = "CHORD";
pub const DEFAULT_ORIGIN: &str = "origin";

/// Parameters fixed at ledger creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub name: String,
    pub symbol: String,
    /// Minted in full to `origin` at creation, in minimal units.
    pub initial_supply: Amount,
    pub decimal_scale: u32,
    pub fee_floor_bps: u32,
    pub fee_ceiling_bps: u32,
    pub fee_step_bps: u32,
    /// Epochs before the fee drops to zero for good.
    pub total_epochs: u32,
    /// Gross burn needed to traverse one epoch, in minimal units.
    pub epoch_burn_quota: Amount,
    /// Share of `epoch_burn_quota` minted back per completed epoch.
    pub redistribution_ratio_bps: u32,
    pub origin: Address,
    /// The only caller allowed to toggle exemptions.
    pub administrator: Address,
}

impl LedgerConfig {
    /// Create a configuration with default metadata. `origin` receives the
    /// initial supply and also acts as administrator until overridden.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        initial_supply: Amount,
        decimal_scale: u32,
        fee_floor_bps: u32,
        fee_ceiling_bps: u32,
        fee_step_bps: u32,
        total_epochs: u32,
        epoch_burn_quota: Amount,
        redistribution_ratio_bps: u32,
    ) -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            symbol: DEFAULT_SYMBOL.to_string(),
            initial_supply,
            decimal_scale,
            fee_floor_bps,
            fee_ceiling_bps,
            fee_step_bps,
            total_epochs,
            epoch_burn_quota,
            redistribution_ratio_bps,
            origin: Address::from(DEFAULT_ORIGIN),
            administrator: Address::from(DEFAULT_ORIGIN),
        }
    }

    pub fn with_metadata(mut self, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        self.name = name.into();
        self.symbol = symbol.into();
        self
    }

    pub fn with_origin(mut self, origin: Address) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_administrator(mut self, administrator: Address) -> Self {
        self.administrator = administrator;
        self
    }

    /// Check every construction invariant.
    pub fn validate(&self) -> Result<()> {
        if self.initial_supply.is_zero() {
            return Err(invalid("initial supply must be positive"));
        }
        if self.decimal_scale > MAX_DECIMAL_SCALE {
            return Err(invalid(format!(
                "decimal scale {} exceeds {}",
                self.decimal_scale, MAX_DECIMAL_SCALE
            )));
        }
        if self.fee_floor_bps > self.fee_ceiling_bps {
            return Err(invalid(format!(
                "fee floor {} above fee ceiling {}",
                self.fee_floor_bps, self.fee_ceiling_bps
            )));
        }
        if self.fee_ceiling_bps > BPS_DENOMINATOR {
            return Err(invalid(format!(
                "fee ceiling {} exceeds {} bps",
                self.fee_ceiling_bps, BPS_DENOMINATOR
            )));
        }
        let span = self.fee_ceiling_bps - self.fee_floor_bps;
        if self.fee_step_bps == 0 {
            if span != 0 {
                return Err(invalid("fee step must be positive"));
            }
        } else if span % self.fee_step_bps != 0 {
            return Err(invalid(format!(
                "fee span {} is not a multiple of step {}",
                span, self.fee_step_bps
            )));
        }
        if self.total_epochs == 0 {
            return Err(invalid("total epochs must be positive"));
        }
        if self.epoch_burn_quota.is_zero() {
            return Err(invalid("epoch burn quota must be positive"));
        }
        if self.epoch_burn_quota.raw() < u128::from(self.num_steps()) {
            return Err(invalid(format!(
                "epoch burn quota {} is smaller than the {} fee steps",
                self.epoch_burn_quota,
                self.num_steps()
            )));
        }
        if self.redistribution_ratio_bps > BPS_DENOMINATOR {
            return Err(invalid(format!(
                "redistribution ratio {} exceeds {} bps",
                self.redistribution_ratio_bps, BPS_DENOMINATOR
            )));
        }
        Ok(())
    }

    /// Number of fee increments between floor and ceiling.
    pub fn num_steps(&self) -> u32 {
        if self.fee_step_bps == 0 {
            return 0;
        }
        self.fee_ceiling_bps.saturating_sub(self.fee_floor_bps) / self.fee_step_bps
    }

    /// Burn progress within an epoch that raises the fee by one step.
    pub fn step_unit(&self) -> Amount {
        match self.num_steps() {
            0 => self.epoch_burn_quota,
            steps => Amount::from_raw(self.epoch_burn_quota.raw() / u128::from(steps)),
        }
    }

    /// Tokens minted back to holders each time an epoch completes.
    pub fn redistribution_amount_per_epoch(&self) -> Amount {
        // Split to stay in range for any quota.
        let quota = self.epoch_burn_quota.raw();
        let ratio = u128::from(self.redistribution_ratio_bps);
        let denominator = u128::from(BPS_DENOMINATOR);
        Amount::from_raw(quota / denominator * ratio + quota % denominator * ratio / denominator)
    }
}

fn invalid(reason: impl Into<String>) -> LedgerError {
    LedgerError::ConfigurationInvalid(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord() -> LedgerConfig {
        LedgerConfig::new(
            Amount::from_raw(100_000_000),
            0,
            500,
            1000,
            50,
            120,
            Amount::from_raw(500_000),
            5000,
        )
    }

    #[test]
    fn test_valid_config() {
        let config = chord();
        assert!(config.validate().is_ok());
        assert_eq!(config.num_steps(), 10);
        assert_eq!(config.step_unit().raw(), 50_000);
        assert_eq!(config.redistribution_amount_per_epoch().raw(), 250_000);
    }

    #[test]
    fn test_unaligned_step_rejected() {
        let mut config = chord();
        config.fee_step_bps = 30;
        assert!(matches!(
            config.validate(),
            Err(LedgerError::ConfigurationInvalid(_))
        ));
    }

    #[test]
    fn test_zero_quota_and_epochs_rejected() {
        let mut config = chord();
        config.epoch_burn_quota = Amount::ZERO;
        assert!(config.validate().is_err());

        let mut config = chord();
        config.total_epochs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let mut config = chord();
        config.fee_floor_bps = 1200;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_flat_fee_without_step() {
        let mut config = chord();
        config.fee_ceiling_bps = 500;
        config.fee_step_bps = 0;
        assert!(config.validate().is_ok());
        assert_eq!(config.num_steps(), 0);
        assert_eq!(config.step_unit(), config.epoch_burn_quota);
    }

    #[test]
    fn test_ratio_above_one_rejected() {
        let mut config = chord();
        config.redistribution_ratio_bps = 10_001;
        assert!(config.validate().is_err());
    }
}
