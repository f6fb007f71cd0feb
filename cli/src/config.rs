//! Node configuration file

use anyhow::{Context, Result};
use chord_core::{config, Address, Amount, LedgerConfig};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct NodeConfig {
    pub ledger: LedgerSection,
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub api: ApiSection,
}

/// Ledger parameters; supply and quota are in whole tokens.
#[derive(Debug, Deserialize)]
pub struct LedgerSection {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_symbol")]
    pub symbol: String,
    pub initial_supply: u64,
    pub decimal_scale: u32,
    pub fee_floor_bps: u32,
    pub fee_ceiling_bps: u32,
    pub fee_step_bps: u32,
    pub total_epochs: u32,
    pub epoch_burn_quota: u64,
    pub redistribution_ratio_bps: u32,
    #[serde(default = "default_origin")]
    pub origin: String,
    pub administrator: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StorageSection {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct ApiSection {
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_name() -> String {
    config::DEFAULT_NAME.to_string()
}

fn default_symbol() -> String {
    config::DEFAULT_SYMBOL.to_string()
}

fn default_origin() -> String {
    config::DEFAULT_ORIGIN.to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 24200))
}

impl NodeConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

impl LedgerSection {
    /// Scale token figures to minimal units and validate.
    pub fn to_ledger_config(&self) -> Result<LedgerConfig> {
        let origin = Address::new(self.origin.clone());
        let administrator = self
            .administrator
            .clone()
            .map(Address::new)
            .unwrap_or_else(|| origin.clone());

        let config = LedgerConfig::new(
            Amount::scale(u128::from(self.initial_supply), self.decimal_scale)?,
            self.decimal_scale,
            self.fee_floor_bps,
            self.fee_ceiling_bps,
            self.fee_step_bps,
            self.total_epochs,
            Amount::scale(u128::from(self.epoch_burn_quota), self.decimal_scale)?,
            self.redistribution_ratio_bps,
        )
        .with_metadata(self.name.clone(), self.symbol.clone())
        .with_origin(origin)
        .with_administrator(administrator);

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"
        [ledger]
        initial_supply = 100000000
        decimal_scale = 8
        fee_floor_bps = 500
        fee_ceiling_bps = 1000
        fee_step_bps = 50
        total_epochs = 120
        epoch_burn_quota = 500000
        redistribution_ratio_bps = 5000
        administrator = "admin"

        [api]
        listen = "0.0.0.0:9000"
    "#;

    #[test]
    fn test_parse_example() {
        let config = NodeConfig::parse(EXAMPLE).unwrap();
        assert_eq!(config.storage.data_dir, PathBuf::from("data"));
        assert_eq!(config.api.listen.port(), 9000);

        let ledger = config.ledger.to_ledger_config().unwrap();
        assert_eq!(ledger.initial_supply.raw(), 100_000_000 * 100_000_000);
        assert_eq!(ledger.epoch_burn_quota.raw(), 500_000 * 100_000_000);
        assert_eq!(ledger.symbol, "CHORD");
        assert_eq!(ledger.origin, Address::from("origin"));
        assert_eq!(ledger.administrator, Address::from("admin"));
    }

    #[test]
    fn test_administrator_defaults_to_origin() {
        let config = NodeConfig::parse(&EXAMPLE.replace("administrator = \"admin\"", "")).unwrap();
        let ledger = config.ledger.to_ledger_config().unwrap();
        assert_eq!(ledger.administrator, ledger.origin);
    }

    #[test]
    fn test_invalid_curve_rejected() {
        let config =
            NodeConfig::parse(&EXAMPLE.replace("fee_step_bps = 50", "fee_step_bps = 70")).unwrap();
        assert!(config.ledger.to_ledger_config().is_err());
    }

    #[test]
    fn test_bundled_example_is_valid() {
        let config = NodeConfig::parse(include_str!("../chord.example.toml")).unwrap();
        assert!(config.ledger.to_ledger_config().is_ok());
    }

    #[test]
    fn test_missing_ledger_section() {
        assert!(NodeConfig::parse("[storage]\ndata_dir = \"x\"").is_err());
    }
}
