//! Ledger persistence on top of [`Storage`]

use chord_core::Ledger;
use log::info;
use std::path::Path;

use crate::snapshot::Storage;
use crate::Result;

/// Snapshot name holding the current ledger.
pub const LEDGER_SNAPSHOT: &str = "ledger";

pub struct LedgerStore {
    storage: Storage,
}

impl LedgerStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            storage: Storage::open(path)?,
        })
    }

    pub fn has_ledger(&self) -> bool {
        self.storage.has_snapshot(LEDGER_SNAPSHOT)
    }

    pub fn save_ledger(&self, ledger: &Ledger) -> Result<()> {
        self.storage.save_snapshot(LEDGER_SNAPSHOT, ledger)
    }

    pub fn load_ledger(&self) -> Result<Ledger> {
        let ledger: Ledger = self.storage.load_snapshot(LEDGER_SNAPSHOT)?;
        info!(
            "loaded {} ledger from {}: supply {}, epoch {}/{}",
            ledger.symbol(),
            self.storage.data_dir().display(),
            ledger.total_supply().display(ledger.decimals()),
            ledger.current_epoch(),
            ledger.total_epochs()
        );
        Ok(ledger)
    }

    /// Keep a copy of the current ledger under `name`.
    pub fn archive(&self, ledger: &Ledger, name: &str) -> Result<()> {
        self.storage.save_snapshot(name, ledger)
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }
}
