//! Chord Storage Layer - File-Based Ledger Snapshots
//!
//! The ledger lives in memory; a snapshot is written after each committed
//! change and loaded once on startup.

pub mod ledger_store;
pub mod snapshot;

pub use ledger_store::{LedgerStore, LEDGER_SNAPSHOT};
pub use snapshot::Storage;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),

    #[error("Invalid snapshot name: {0}")]
    InvalidName(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;
