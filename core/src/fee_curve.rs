//! Fee curve
//!
//! The fee starts every epoch at the floor and rises one step each time the
//! burn progress within the epoch crosses another `step_unit`. Once all
//! epochs are spent the fee is zero for good.

use crate::config::LedgerConfig;

/// Fee in basis points for the next transfer.
///
/// `lifetime_gross_burn` must be the counter as it stood before the transfer;
/// the resulting rate applies to the whole transferred amount.
pub fn current_fee_bps(lifetime_gross_burn: u128, epoch_index: u32, config: &LedgerConfig) -> u32 {
    if epoch_index >= config.total_epochs {
        return 0;
    }

    let num_steps = config.num_steps();
    if num_steps == 0 {
        return config.fee_floor_bps;
    }

    let quota = config.epoch_burn_quota.raw();
    let step_unit = config.step_unit().raw().max(1);
    let progress = lifetime_gross_burn % quota;
    let steps = (progress / step_unit).min(u128::from(num_steps)) as u32;

    config.fee_floor_bps + steps * config.fee_step_bps
}
