//! Exemption registry
//!
//! Exempt accounts are taken out of the rate mechanism: their balance is
//! frozen in token terms, they receive no redistribution, and transfers they
//! send carry no fee. Transfers they receive are charged as usual.

use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::account::Address;
use crate::amount::Amount;
use crate::balances::BalanceStore;
use crate::error::{LedgerError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExemptionRegistry {
    administrator: Address,
    excluded: BTreeSet<Address>,
}

impl ExemptionRegistry {
    pub fn new(administrator: Address) -> Self {
        Self {
            administrator,
            excluded: BTreeSet::new(),
        }
    }

    pub fn is_excluded(&self, account: &Address) -> bool {
        self.excluded.contains(account)
    }

    pub fn excluded(&self) -> impl Iterator<Item = &Address> {
        self.excluded.iter()
    }

    fn authorize(&self, caller: &Address) -> Result<()> {
        if caller != &self.administrator {
            return Err(LedgerError::Unauthorized(caller.clone()));
        }
        Ok(())
    }

    /// Snapshot `account`'s balance into a static holding and mark it exempt.
    ///
    /// Returns the frozen token balance.
    pub fn exclude(
        &mut self,
        caller: &Address,
        account: &Address,
        store: &mut BalanceStore,
    ) -> Result<Amount> {
        self.authorize(caller)?;
        if self.is_excluded(account) {
            return Err(LedgerError::AlreadyExcluded(account.clone()));
        }

        let tokens = store.convert_to_static(account)?;
        self.excluded.insert(account.clone());

        info!("excluded {} with frozen balance {}", account, tokens);
        Ok(tokens)
    }

    /// Return `account` to reflected holding at the current rate.
    pub fn include(
        &mut self,
        caller: &Address,
        account: &Address,
        store: &mut BalanceStore,
    ) -> Result<Amount> {
        self.authorize(caller)?;
        if !self.is_excluded(account) {
            return Err(LedgerError::AlreadyIncluded(account.clone()));
        }

        let tokens = store.convert_to_reflected(account)?;
        self.excluded.remove(account);

        info!("included {} with balance {}", account, tokens);
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (ExemptionRegistry, BalanceStore) {
        let admin = Address::from("admin");
        let store = BalanceStore::genesis(Address::from("origin"), Amount::from_raw(1_000_000))
            .unwrap();
        (ExemptionRegistry::new(admin), store)
    }

    #[test]
    fn test_exclude_and_include() {
        let (mut registry, mut store) = setup();
        let admin = Address::from("admin");
        let origin = Address::from("origin");

        let frozen = registry.exclude(&admin, &origin, &mut store).unwrap();
        assert_eq!(frozen.raw(), 1_000_000);
        assert!(registry.is_excluded(&origin));
        assert!(store.is_static(&origin));
        assert_eq!(store.static_supply().raw(), 1_000_000);

        let restored = registry.include(&admin, &origin, &mut store).unwrap();
        assert_eq!(restored.raw(), 1_000_000);
        assert!(!registry.is_excluded(&origin));
        assert_eq!(store.balance_of(&origin).raw(), 1_000_000);
        assert_eq!(store.static_supply(), Amount::ZERO);
    }

    #[test]
    fn test_non_admin_rejected() {
        let (mut registry, mut store) = setup();
        let origin = Address::from("origin");

        let result = registry.exclude(&origin, &origin, &mut store);
        assert_eq!(result, Err(LedgerError::Unauthorized(origin.clone())));
        assert!(!registry.is_excluded(&origin));
        assert!(!store.is_static(&origin));
    }

    #[test]
    fn test_double_toggle_rejected() {
        let (mut registry, mut store) = setup();
        let admin = Address::from("admin");
        let origin = Address::from("origin");

        assert!(matches!(
            registry.include(&admin, &origin, &mut store),
            Err(LedgerError::AlreadyIncluded(_))
        ));
        registry.exclude(&admin, &origin, &mut store).unwrap();
        assert!(matches!(
            registry.exclude(&admin, &origin, &mut store),
            Err(LedgerError::AlreadyExcluded(_))
        ));
    }

    #[test]
    fn test_unknown_account_can_be_excluded() {
        let (mut registry, mut store) = setup();
        let admin = Address::from("admin");
        let pool = Address::from("pool");

        assert_eq!(registry.exclude(&admin, &pool, &mut store).unwrap(), Amount::ZERO);
        assert!(store.is_static(&pool));
    }
}
