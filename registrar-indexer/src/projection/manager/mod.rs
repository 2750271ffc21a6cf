//! ProjectionManager - sequential event application
//!
//! # Event Flow
//!
//! ```text
//! process_event(event)
//!     ├─ 1. Cursor check (before transaction)
//!     ├─ 2. Begin write transaction
//!     ├─ 3. Cursor check again inside the transaction
//!     ├─ 4. Create ProjectionContext
//!     ├─ 5. Apply the event via its EventApplier
//!     ├─ 6. Advance the cursor
//!     ├─ 7. Commit transaction
//!     └─ 8. Broadcast the event
//! ```
//!
//! An applier error drops the transaction, so a failed event leaves no
//! partial writes and the cursor stays where it was.

mod error;
pub use error::*;

use super::appliers::apply_event;
use super::gateway::ContractGateway;
use super::storage::{EntityStorage, StorageError};
use super::traits::ProjectionContext;
use shared::registrar::{Account, AuctionedName, Deed, EventPosition, RegistrarEvent, StatsEntity};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 4096;

/// Result of handing one event to the manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Projected and committed
    Applied,
    /// At or before the cursor; nothing was written
    Duplicate,
}

/// ProjectionManager - owns the store, the gateway and the broadcast channel
pub struct ProjectionManager {
    storage: EntityStorage,
    gateway: Arc<dyn ContractGateway>,
    event_tx: broadcast::Sender<RegistrarEvent>,
}

impl std::fmt::Debug for ProjectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectionManager")
            .field("storage", &"<EntityStorage>")
            .field("gateway", &"<dyn ContractGateway>")
            .field("event_tx", &"<broadcast::Sender>")
            .finish()
    }
}

impl ProjectionManager {
    /// Create a manager over the database at `db_path`
    pub fn new(
        db_path: impl AsRef<Path>,
        gateway: Arc<dyn ContractGateway>,
    ) -> ManagerResult<Self> {
        let storage = EntityStorage::open(db_path)?;
        let manager = Self::with_storage(storage, gateway);
        tracing::info!(cursor = ?manager.get_cursor()?, "ProjectionManager opened");
        Ok(manager)
    }

    /// Create a manager with existing storage
    pub fn with_storage(storage: EntityStorage, gateway: Arc<dyn ContractGateway>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            storage,
            gateway,
            event_tx,
        }
    }

    /// Subscribe to committed events
    pub fn subscribe(&self) -> broadcast::Receiver<RegistrarEvent> {
        self.event_tx.subscribe()
    }

    /// Get the underlying storage
    pub fn storage(&self) -> &EntityStorage {
        &self.storage
    }

    /// Project one event
    pub fn process_event(&self, event: &RegistrarEvent) -> ManagerResult<ProcessOutcome> {
        let position = event.position();
        tracing::debug!(
            block_number = event.block_number,
            log_index = event.log_index,
            event_type = %event.event_type(),
            "Processing event"
        );

        // 1. Cursor check (before transaction)
        if is_replay(self.storage.get_cursor()?, position) {
            tracing::warn!(
                block_number = event.block_number,
                log_index = event.log_index,
                "Duplicate event"
            );
            return Ok(ProcessOutcome::Duplicate);
        }

        // 2. Begin write transaction
        let txn = self.storage.begin_write()?;

        // 3. Double-check within transaction
        if is_replay(self.storage.get_cursor_txn(&txn)?, position) {
            return Ok(ProcessOutcome::Duplicate);
        }

        // 4-5. Apply
        {
            let ctx = ProjectionContext::new(&txn, &self.storage, self.gateway.as_ref());
            apply_event(&ctx, event).map_err(|source| {
                tracing::error!(
                    block_number = event.block_number,
                    log_index = event.log_index,
                    event_type = %event.event_type(),
                    error = %source,
                    "Event projection failed, transaction dropped"
                );
                ManagerError::Projection {
                    block_number: event.block_number,
                    log_index: event.log_index,
                    source,
                }
            })?;
        }

        // 6. Advance cursor
        self.storage.set_cursor(&txn, position)?;

        // 7. Commit
        txn.commit().map_err(StorageError::from)?;

        // 8. Broadcast; having no subscribers is fine
        let _ = self.event_tx.send(event.clone());

        Ok(ProcessOutcome::Applied)
    }

    // ========== Queries ==========

    pub fn get_account(&self, id: &str) -> ManagerResult<Option<Account>> {
        Ok(self.storage.get_account(id)?)
    }

    pub fn get_name(&self, id: &str) -> ManagerResult<Option<AuctionedName>> {
        Ok(self.storage.get_name(id)?)
    }

    pub fn get_all_names(&self) -> ManagerResult<Vec<AuctionedName>> {
        Ok(self.storage.get_all_names()?)
    }

    pub fn get_deed(&self, id: &str) -> ManagerResult<Option<Deed>> {
        Ok(self.storage.get_deed(id)?)
    }

    pub fn get_all_deeds(&self) -> ManagerResult<Vec<Deed>> {
        Ok(self.storage.get_all_deeds()?)
    }

    /// Aggregate record; zeroed if no event has touched it yet
    pub fn get_stats(&self) -> ManagerResult<StatsEntity> {
        Ok(self.storage.get_stats()?.unwrap_or_default())
    }

    /// Position of the last applied event
    pub fn get_cursor(&self) -> ManagerResult<Option<EventPosition>> {
        Ok(self.storage.get_cursor()?)
    }
}

fn is_replay(cursor: Option<EventPosition>, position: EventPosition) -> bool {
    cursor.is_some_and(|cursor| position <= cursor)
}

#[cfg(test)]
mod tests;
