//! Epoch accounting
//!
//! Tracks lifetime burn and the epoch index. Burn is always counted in full,
//! but the index catches up by at most one epoch per transfer, and each
//! advance mints exactly one redistribution.

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::config::LedgerConfig;
use crate::error::Result;

/// A redistribution fired by an epoch advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redistribution {
    /// Epoch index after the advance.
    pub epoch: u32,
    pub mint_amount: Amount,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochLedger {
    lifetime_gross_burn: Amount,
    epoch_index: u32,
    total_redistributed: Amount,
}

impl EpochLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lifetime_gross_burn(&self) -> Amount {
        self.lifetime_gross_burn
    }

    pub fn epoch_index(&self) -> u32 {
        self.epoch_index
    }

    pub fn total_redistributed(&self) -> Amount {
        self.total_redistributed
    }

    /// Gross burn minus everything minted back so far.
    pub fn total_net_burn(&self) -> Amount {
        Amount::from_raw(
            self.lifetime_gross_burn
                .raw()
                .saturating_sub(self.total_redistributed.raw()),
        )
    }

    pub fn is_exhausted(&self, config: &LedgerConfig) -> bool {
        self.epoch_index >= config.total_epochs
    }

    /// Epoch the burn counter has reached, capped at `total_epochs`.
    pub fn target_epoch(&self, config: &LedgerConfig) -> u32 {
        let reached = self.lifetime_gross_burn.raw() / config.epoch_burn_quota.raw();
        reached.min(u128::from(config.total_epochs)) as u32
    }

    /// State after burning `gross_fee`, and the redistribution to mint if
    /// this burn advances the epoch. `self` is left untouched so the caller
    /// can validate the rest of the transfer before committing.
    pub fn after_burn(
        &self,
        gross_fee: Amount,
        config: &LedgerConfig,
    ) -> Result<(EpochLedger, Option<Redistribution>)> {
        let mut next = self.clone();
        next.lifetime_gross_burn = next.lifetime_gross_burn.checked_add(gross_fee)?;

        if next.epoch_index >= next.target_epoch(config) {
            return Ok((next, None));
        }

        next.epoch_index += 1;
        let mint_amount = config.redistribution_amount_per_epoch();
        next.total_redistributed = next.total_redistributed.checked_add(mint_amount)?;

        let epoch = next.epoch_index;
        Ok((next, Some(Redistribution { epoch, mint_amount })))
    }
}
