//! Scaled-balance store
//!
//! Non-exempt accounts hold *reflected* units. Their token balance is
//! `reflected / rate`, where
//!
//! ```text
//! rate = total_reflected / (total_supply - static_supply)
//! ```
//!
//! Minting a redistribution raises `total_supply` while `total_reflected`
//! stays put, so every reflected balance grows without being touched.
//! Exempt accounts hold static token amounts that the rate never affects.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::account::{Address, Holding};
use crate::amount::Amount;
use crate::error::{LedgerError, Result};

/// Upper bound for the reflected space. The headroom below `u128::MAX` keeps
/// `amount * rate` in range after redistributions have grown the supply.
pub const MAX_REFLECTED: u128 = u128::MAX >> 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceStore {
    accounts: HashMap<Address, Holding>,
    total_supply: Amount,
    /// Sum of reflected units over reflected accounts.
    total_reflected: u128,
    /// Sum of token balances over static accounts.
    static_supply: Amount,
    /// Rate at creation; used while no reflected tokens are in circulation.
    base_rate: u128,
}

/// Balance changes of one transfer, computed in full before anything is written.
#[derive(Debug)]
pub(crate) struct TransferPlan {
    sender: (Address, Holding),
    recipient: (Address, Holding),
    total_supply: Amount,
    total_reflected: u128,
    static_supply: Amount,
}

impl BalanceStore {
    /// Mint `initial_supply` to `origin` as a reflected holding.
    pub fn genesis(origin: Address, initial_supply: Amount) -> Result<Self> {
        if initial_supply.is_zero() {
            return Err(LedgerError::ConfigurationInvalid(
                "initial supply must be positive".to_string(),
            ));
        }
        let supply = initial_supply.raw();
        if supply > MAX_REFLECTED {
            return Err(LedgerError::ConfigurationInvalid(format!(
                "initial supply {} exceeds the reflected space",
                supply
            )));
        }
        let total_reflected = MAX_REFLECTED - MAX_REFLECTED % supply;

        let mut accounts = HashMap::new();
        accounts.insert(
            origin,
            Holding::Reflected {
                reflected: total_reflected,
            },
        );

        Ok(Self {
            accounts,
            total_supply: initial_supply,
            total_reflected,
            static_supply: Amount::ZERO,
            base_rate: total_reflected / supply,
        })
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn total_reflected(&self) -> u128 {
        self.total_reflected
    }

    pub fn static_supply(&self) -> Amount {
        self.static_supply
    }

    /// Tokens held through reflected accounts.
    pub fn reflected_token_supply(&self) -> Amount {
        Amount::from_raw(
            self.total_supply
                .raw()
                .saturating_sub(self.static_supply.raw()),
        )
    }

    /// Reflected units per token.
    pub fn rate(&self) -> u128 {
        let tokens = self.reflected_token_supply().raw();
        if self.total_reflected == 0 || tokens == 0 {
            return self.base_rate;
        }
        (self.total_reflected / tokens).max(1)
    }

    pub fn holding(&self, account: &Address) -> Option<&Holding> {
        self.accounts.get(account)
    }

    pub fn accounts(&self) -> impl Iterator<Item = (&Address, &Holding)> {
        self.accounts.iter()
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        match self.accounts.get(account) {
            Some(holding) => observed(holding, self.rate()),
            None => Amount::ZERO,
        }
    }

    pub fn is_static(&self, account: &Address) -> bool {
        self.accounts
            .get(account)
            .map(Holding::is_static)
            .unwrap_or(false)
    }

    pub fn token_from_reflection(&self, reflected: u128) -> Amount {
        Amount::from_raw(reflected / self.rate())
    }

    pub fn reflection_from_token(&self, amount: Amount) -> Result<u128> {
        amount
            .raw()
            .checked_mul(self.rate())
            .ok_or(LedgerError::ArithmeticOverflow("reflection"))
    }

    /// Plan moving `amount` out of `sender` and `amount - fee` into
    /// `recipient`, burning `fee` and then minting `mint` to reflected holders.
    ///
    /// The caller has already checked the sender's balance.
    pub(crate) fn plan_transfer(
        &self,
        sender: &Address,
        recipient: &Address,
        amount: Amount,
        fee: Amount,
        mint: Amount,
    ) -> Result<TransferPlan> {
        let rate = self.rate();
        let net = amount.checked_sub(fee)?;
        let mut total_reflected = self.total_reflected;
        let mut static_supply = self.static_supply;

        let sender_before = self.accounts.get(sender).copied().unwrap_or_default();
        let sender_after = match sender_before {
            Holding::Reflected { reflected } => {
                let units = amount
                    .raw()
                    .checked_mul(rate)
                    .ok_or(LedgerError::ArithmeticOverflow("debit"))?;
                total_reflected = total_reflected
                    .checked_sub(units)
                    .ok_or(LedgerError::ArithmeticOverflow("debit"))?;
                Holding::Reflected {
                    reflected: reflected
                        .checked_sub(units)
                        .ok_or(LedgerError::ArithmeticOverflow("debit"))?,
                }
            }
            Holding::Static { tokens } => {
                static_supply = static_supply.checked_sub(amount)?;
                Holding::Static {
                    tokens: tokens.checked_sub(amount)?,
                }
            }
        };

        let recipient_before = if recipient == sender {
            sender_after
        } else {
            self.accounts.get(recipient).copied().unwrap_or_default()
        };
        let recipient_after = match recipient_before {
            Holding::Reflected { reflected } => {
                let units = net
                    .raw()
                    .checked_mul(rate)
                    .ok_or(LedgerError::ArithmeticOverflow("credit"))?;
                total_reflected = total_reflected
                    .checked_add(units)
                    .ok_or(LedgerError::ArithmeticOverflow("credit"))?;
                Holding::Reflected {
                    reflected: reflected
                        .checked_add(units)
                        .ok_or(LedgerError::ArithmeticOverflow("credit"))?,
                }
            }
            Holding::Static { tokens } => {
                static_supply = static_supply.checked_add(net)?;
                Holding::Static {
                    tokens: tokens.checked_add(net)?,
                }
            }
        };

        let total_supply = Amount::from_raw(self.total_supply.raw().saturating_sub(fee.raw()))
            .checked_add(mint)?;

        Ok(TransferPlan {
            sender: (sender.clone(), sender_after),
            recipient: (recipient.clone(), recipient_after),
            total_supply,
            total_reflected,
            static_supply,
        })
    }

    pub(crate) fn commit(&mut self, plan: TransferPlan) {
        let (sender, sender_after) = plan.sender;
        let (recipient, recipient_after) = plan.recipient;
        // For a self-transfer the recipient entry already includes the debit.
        self.accounts.insert(sender, sender_after);
        self.accounts.insert(recipient, recipient_after);
        self.total_supply = plan.total_supply;
        self.total_reflected = plan.total_reflected;
        self.static_supply = plan.static_supply;
    }

    /// Swap an account to a static holding of its current token balance.
    pub(crate) fn convert_to_static(&mut self, account: &Address) -> Result<Amount> {
        let rate = self.rate();
        let holding = self.accounts.get(account).copied().unwrap_or_default();
        let reflected = match holding {
            Holding::Reflected { reflected } => reflected,
            Holding::Static { .. } => return Err(LedgerError::AlreadyExcluded(account.clone())),
        };
        let tokens = Amount::from_raw(reflected / rate);
        let static_supply = self.static_supply.checked_add(tokens)?;

        self.total_reflected = self.total_reflected.saturating_sub(reflected);
        self.static_supply = static_supply;
        self.accounts
            .insert(account.clone(), Holding::Static { tokens });
        Ok(tokens)
    }

    /// Swap a static holding back to reflected units at the current rate.
    pub(crate) fn convert_to_reflected(&mut self, account: &Address) -> Result<Amount> {
        let tokens = match self.accounts.get(account) {
            Some(Holding::Static { tokens }) => *tokens,
            _ => return Err(LedgerError::AlreadyIncluded(account.clone())),
        };

        let rate = self.rate();
        let reflected = tokens
            .raw()
            .checked_mul(rate)
            .ok_or(LedgerError::ArithmeticOverflow("include"))?;
        let total_reflected = self
            .total_reflected
            .checked_add(reflected)
            .ok_or(LedgerError::ArithmeticOverflow("include"))?;

        self.total_reflected = total_reflected;
        self.static_supply = Amount::from_raw(self.static_supply.raw().saturating_sub(tokens.raw()));
        self.accounts
            .insert(account.clone(), Holding::Reflected { reflected });
        Ok(tokens)
    }
}

fn observed(holding: &Holding, rate: u128) -> Amount {
    match holding {
        Holding::Reflected { reflected } => Amount::from_raw(reflected / rate),
        Holding::Static { tokens } => *tokens,
    }
}
