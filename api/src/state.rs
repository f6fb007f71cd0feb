//! API State Management
//!
//! The ledger sits behind one `RwLock`: queries share the read side, every
//! mutation holds the write side for its whole duration, including the
//! snapshot write when storage is attached.

use chord_core::Ledger;
use chord_storage::LedgerStore;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::error;

use crate::{ApiError, ApiResult};

#[derive(Clone)]
pub struct ApiState {
    pub ledger: Arc<RwLock<Ledger>>,
    pub store: Option<Arc<LedgerStore>>,
    pub start_time: std::time::Instant,
}

impl ApiState {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(ledger)),
            store: None,
            start_time: std::time::Instant::now(),
        }
    }

    /// Persist a snapshot after every successful mutation
    pub fn with_store(mut self, store: Arc<LedgerStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Run `op` on a copy of the ledger, persist the copy, then swap it in.
    ///
    /// The live ledger only changes once the snapshot is on disk, so a
    /// failed save leaves nothing applied. The file write runs on the
    /// blocking pool.
    pub async fn mutate<T, F>(&self, op: F) -> ApiResult<T>
    where
        F: FnOnce(&mut Ledger) -> chord_core::Result<T>,
    {
        let mut ledger = self.ledger.write().await;
        let mut candidate = ledger.clone();
        let output = op(&mut candidate)?;

        if let Some(store) = &self.store {
            let store = Arc::clone(store);
            candidate = tokio::task::spawn_blocking(move || {
                store.save_ledger(&candidate).map(|()| candidate)
            })
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?
            .inspect_err(|e| error!("snapshot failed, ledger left unchanged: {}", e))?;
        }

        *ledger = candidate;
        Ok(output)
    }
}
