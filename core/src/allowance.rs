//! Spending allowances for delegated transfers

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::account::Address;
use crate::amount::Amount;
use crate::error::{LedgerError, Result};

/// owner -> spender -> remaining allowance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allowances {
    grants: HashMap<Address, HashMap<Address, Amount>>,
}

impl Allowances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.grants
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or_default()
    }

    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: Amount) {
        if amount.is_zero() {
            if let Some(spenders) = self.grants.get_mut(owner) {
                spenders.remove(spender);
                if spenders.is_empty() {
                    self.grants.remove(owner);
                }
            }
            return;
        }
        self.grants
            .entry(owner.clone())
            .or_default()
            .insert(spender.clone(), amount);
    }

    pub fn increase(&mut self, owner: &Address, spender: &Address, added: Amount) -> Result<Amount> {
        let updated = self.allowance(owner, spender).checked_add(added)?;
        self.approve(owner, spender, updated);
        Ok(updated)
    }

    pub fn decrease(
        &mut self,
        owner: &Address,
        spender: &Address,
        subtracted: Amount,
    ) -> Result<Amount> {
        let updated = self.remaining_after(owner, spender, subtracted)?;
        self.approve(owner, spender, updated);
        Ok(updated)
    }

    /// Allowance left once `amount` is spent, without spending it.
    pub fn remaining_after(
        &self,
        owner: &Address,
        spender: &Address,
        amount: Amount,
    ) -> Result<Amount> {
        let available = self.allowance(owner, spender);
        if available < amount {
            return Err(LedgerError::InsufficientAllowance {
                requested: amount,
                available,
            });
        }
        available.checked_sub(amount)
    }
}
