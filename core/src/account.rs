//! Account identities and balance representations

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::amount::Amount;

/// Address-like key identifying an account.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Address(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(address: &str) -> Self {
        Address(address.to_string())
    }
}

impl From<String> for Address {
    fn from(address: String) -> Self {
        Address(address)
    }
}

/// How an account's balance is stored.
///
/// Reflected holdings are scaled by the global rate and grow when an epoch's
/// redistribution is minted. Static holdings belong to exempt accounts and
/// only change when the account sends or receives a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Holding {
    Reflected { reflected: u128 },
    Static { tokens: Amount },
}

impl Holding {
    pub fn is_static(&self) -> bool {
        matches!(self, Holding::Static { .. })
    }
}

impl Default for Holding {
    fn default() -> Self {
        Holding::Reflected { reflected: 0 }
    }
}
