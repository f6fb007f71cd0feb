//! Ledger state and transfer orchestration

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::account::Address;
use crate::allowance::Allowances;
use crate::amount::Amount;
use crate::balances::BalanceStore;
use crate::config::LedgerConfig;
use crate::epoch::{EpochLedger, Redistribution};
use crate::error::{LedgerError, Result};
use crate::exemption::ExemptionRegistry;
use crate::fee_curve;

/// Outcome of a successful transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub sender: Address,
    pub recipient: Address,
    pub amount: Amount,
    /// Fee rate in force before the transfer.
    pub fee_bps: u32,
    pub gross_fee: Amount,
    pub net_amount: Amount,
    pub redistribution: Option<Redistribution>,
}

/// Point-in-time view of every ledger scalar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStats {
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
    pub total_supply: Amount,
    pub total_burn: Amount,
    pub total_net_burn: Amount,
    pub total_redistributed: Amount,
    pub current_fee_bps: u32,
    pub current_epoch: u32,
    pub total_epochs: u32,
    pub epoch_burn_quota: Amount,
    pub redistribution_per_epoch: Amount,
    pub fee_floor_bps: u32,
    pub fee_ceiling_bps: u32,
    pub fee_step_bps: u32,
    pub excluded_accounts: usize,
}

/// The complete ledger.
///
/// Every mutation takes `&mut self`; a caller sharing the ledger across
/// threads must put it behind a single lock so transfers never interleave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    config: LedgerConfig,
    balances: BalanceStore,
    exemptions: ExemptionRegistry,
    epochs: EpochLedger,
    allowances: Allowances,
}

impl Ledger {
    /// Validate `config` and mint the initial supply to its origin account.
    pub fn new(config: LedgerConfig) -> Result<Self> {
        config.validate()?;
        let balances = BalanceStore::genesis(config.origin.clone(), config.initial_supply)?;
        let exemptions = ExemptionRegistry::new(config.administrator.clone());

        info!(
            "created {} ledger: supply {} to {}, {} epochs of {} burn",
            config.symbol,
            config.initial_supply.display(config.decimal_scale),
            config.origin,
            config.total_epochs,
            config.epoch_burn_quota.display(config.decimal_scale)
        );

        Ok(Self {
            config,
            balances,
            exemptions,
            epochs: EpochLedger::new(),
            allowances: Allowances::new(),
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn balances(&self) -> &BalanceStore {
        &self.balances
    }

    pub fn epochs(&self) -> &EpochLedger {
        &self.epochs
    }

    // Metadata

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn symbol(&self) -> &str {
        &self.config.symbol
    }

    pub fn decimals(&self) -> u32 {
        self.config.decimal_scale
    }

    // Supply and balances

    pub fn total_supply(&self) -> Amount {
        self.balances.total_supply()
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.balance_of(account)
    }

    /// Reflected units per token. Falls when a redistribution is minted.
    pub fn reflection_rate(&self) -> u128 {
        self.balances.rate()
    }

    /// Reflected units for `amount` tokens, optionally net of the current fee.
    pub fn reflection_from_token(&self, amount: Amount, deduct_fee: bool) -> Result<u128> {
        if amount > self.total_supply() {
            return Err(LedgerError::InvalidAmount(format!(
                "{} exceeds total supply {}",
                amount,
                self.total_supply()
            )));
        }
        let amount = if deduct_fee {
            amount.checked_sub(amount.apply_bps(self.current_fee_bps())?)?
        } else {
            amount
        };
        self.balances.reflection_from_token(amount)
    }

    pub fn token_from_reflection(&self, reflected: u128) -> Result<Amount> {
        if reflected > self.balances.total_reflected() {
            return Err(LedgerError::InvalidAmount(format!(
                "{} exceeds total reflections",
                reflected
            )));
        }
        Ok(self.balances.token_from_reflection(reflected))
    }

    // Fee curve and epochs

    pub fn current_fee_bps(&self) -> u32 {
        fee_curve::current_fee_bps(
            self.epochs.lifetime_gross_burn().raw(),
            self.epochs.epoch_index(),
            &self.config,
        )
    }

    pub fn current_epoch(&self) -> u32 {
        self.epochs.epoch_index()
    }

    /// Lifetime gross burn.
    pub fn total_burn(&self) -> Amount {
        self.epochs.lifetime_gross_burn()
    }

    pub fn total_net_burn_to_date(&self) -> Amount {
        self.epochs.total_net_burn()
    }

    pub fn total_redistributed(&self) -> Amount {
        self.epochs.total_redistributed()
    }

    pub fn epoch_burn_quota(&self) -> Amount {
        self.config.epoch_burn_quota
    }

    pub fn fee_floor_bps(&self) -> u32 {
        self.config.fee_floor_bps
    }

    pub fn fee_ceiling_bps(&self) -> u32 {
        self.config.fee_ceiling_bps
    }

    pub fn fee_step_bps(&self) -> u32 {
        self.config.fee_step_bps
    }

    pub fn total_epochs(&self) -> u32 {
        self.config.total_epochs
    }

    pub fn redistribution_ratio_bps(&self) -> u32 {
        self.config.redistribution_ratio_bps
    }

    pub fn redistribution_amount_per_epoch(&self) -> Amount {
        self.config.redistribution_amount_per_epoch()
    }

    // Exemptions

    pub fn is_excluded(&self, account: &Address) -> bool {
        self.exemptions.is_excluded(account)
    }

    pub fn excluded_accounts(&self) -> Vec<Address> {
        self.exemptions.excluded().cloned().collect()
    }

    pub fn exclude(&mut self, caller: &Address, account: &Address) -> Result<Amount> {
        self.exemptions.exclude(caller, account, &mut self.balances)
    }

    pub fn include(&mut self, caller: &Address, account: &Address) -> Result<Amount> {
        self.exemptions.include(caller, account, &mut self.balances)
    }

    // Transfers

    /// Move `amount` from `sender` to `recipient`, burning the current fee
    /// and advancing the epoch ledger. Nothing changes unless every step
    /// succeeds.
    pub fn transfer(
        &mut self,
        sender: &Address,
        recipient: &Address,
        amount: Amount,
    ) -> Result<TransferReceipt> {
        if amount.is_zero() {
            return Err(LedgerError::InvalidAmount(
                "transfer amount must be positive".to_string(),
            ));
        }
        let available = self.balance_of(sender);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                requested: amount,
                available,
            });
        }

        let fee_bps = if self.is_excluded(sender) {
            0
        } else {
            self.current_fee_bps()
        };
        let gross_fee = amount.apply_bps(fee_bps)?;
        let net_amount = amount.checked_sub(gross_fee)?;

        let (epochs, redistribution) = self.epochs.after_burn(gross_fee, &self.config)?;
        let mint = redistribution
            .map(|event| event.mint_amount)
            .unwrap_or_default();
        let plan = self
            .balances
            .plan_transfer(sender, recipient, amount, gross_fee, mint)?;

        self.balances.commit(plan);
        self.epochs = epochs;

        debug!(
            "transfer {} -> {}: amount {}, fee {} bps, burned {}",
            sender, recipient, amount, fee_bps, gross_fee
        );
        if let Some(event) = redistribution {
            info!(
                "epoch {} reached at lifetime burn {}, redistributed {}",
                event.epoch,
                self.epochs.lifetime_gross_burn(),
                event.mint_amount
            );
            if self.epochs.is_exhausted(&self.config) {
                info!(
                    "fee program exhausted after {} epochs",
                    self.config.total_epochs
                );
            }
        }

        Ok(TransferReceipt {
            sender: sender.clone(),
            recipient: recipient.clone(),
            amount,
            fee_bps,
            gross_fee,
            net_amount,
            redistribution,
        })
    }

    // Allowances

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances.allowance(owner, spender)
    }

    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: Amount) {
        self.allowances.approve(owner, spender, amount);
    }

    pub fn increase_allowance(
        &mut self,
        owner: &Address,
        spender: &Address,
        added: Amount,
    ) -> Result<Amount> {
        self.allowances.increase(owner, spender, added)
    }

    pub fn decrease_allowance(
        &mut self,
        owner: &Address,
        spender: &Address,
        subtracted: Amount,
    ) -> Result<Amount> {
        self.allowances.decrease(owner, spender, subtracted)
    }

    /// Transfer on behalf of `owner`, consuming `spender`'s allowance.
    pub fn transfer_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        recipient: &Address,
        amount: Amount,
    ) -> Result<TransferReceipt> {
        let remaining = self.allowances.remaining_after(owner, spender, amount)?;
        let receipt = self.transfer(owner, recipient, amount)?;
        self.allowances.approve(owner, spender, remaining);
        Ok(receipt)
    }

    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            name: self.config.name.clone(),
            symbol: self.config.symbol.clone(),
            decimals: self.config.decimal_scale,
            total_supply: self.total_supply(),
            total_burn: self.total_burn(),
            total_net_burn: self.total_net_burn_to_date(),
            total_redistributed: self.total_redistributed(),
            current_fee_bps: self.current_fee_bps(),
            current_epoch: self.current_epoch(),
            total_epochs: self.config.total_epochs,
            epoch_burn_quota: self.config.epoch_burn_quota,
            redistribution_per_epoch: self.redistribution_amount_per_epoch(),
            fee_floor_bps: self.config.fee_floor_bps,
            fee_ceiling_bps: self.config.fee_ceiling_bps,
            fee_step_bps: self.config.fee_step_bps,
            excluded_accounts: self.exemptions.excluded().count(),
        }
    }
}
