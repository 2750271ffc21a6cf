//! Applier trait and the per-event projection context

use enum_dispatch::enum_dispatch;
use redb::WriteTransaction;
use shared::codec::{Address, H256};
use shared::registrar::{Account, AuctionedName, Deed, RegistrarEvent};
use thiserror::Error;

use super::gateway::{ContractGateway, GatewayError};
use super::stats::StatsAggregator;
use super::storage::{EntityStorage, StorageError};

/// Projection errors
///
/// Any error aborts the event: the transaction is dropped and nothing the
/// applier wrote becomes visible.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// The event refers to a name no `AuctionStarted` created
    #[error("Auctioned name not found: {0}")]
    MissingName(String),

    /// The name exists but has never had a winning bid
    #[error("Auctioned name {0} has no deed")]
    NameWithoutDeed(String),

    /// The name points at a deed record that does not exist
    #[error("Deed {deed} referenced by name {name} not found")]
    MissingDeed { name: String, deed: String },

    /// A winning bid resolved to a deed that is still open, so the deed
    /// source does not answer per bid
    #[error("Winning bid on {name} resolved to already open deed {deed}")]
    DeedAlreadyOpen { name: String, deed: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

pub type ProjectionResult<T> = Result<T, ProjectionError>;

/// Event applier - projects one event kind onto the entity store
#[enum_dispatch]
pub trait EventApplier {
    fn apply(&self, ctx: &ProjectionContext<'_>, event: &RegistrarEvent) -> ProjectionResult<()>;
}

/// Everything an applier may read or write while handling one event
///
/// All writes go to the event's transaction.
pub struct ProjectionContext<'a> {
    txn: &'a WriteTransaction,
    storage: &'a EntityStorage,
    gateway: &'a dyn ContractGateway,
}

impl<'a> ProjectionContext<'a> {
    pub fn new(
        txn: &'a WriteTransaction,
        storage: &'a EntityStorage,
        gateway: &'a dyn ContractGateway,
    ) -> Self {
        Self {
            txn,
            storage,
            gateway,
        }
    }

    /// Stats handle bound to this event's transaction
    pub fn stats(&self) -> StatsAggregator<'a> {
        StatsAggregator::new(self.txn, self.storage)
    }

    // ========== Names ==========

    pub fn load_name(&self, id: &str) -> ProjectionResult<Option<AuctionedName>> {
        Ok(self.storage.get_name_txn(self.txn, id)?)
    }

    /// Load a name that must already exist
    pub fn require_name(&self, id: &str) -> ProjectionResult<AuctionedName> {
        self.load_name(id)?.ok_or_else(|| {
            tracing::error!(name = %id, "Event references unknown auctioned name");
            ProjectionError::MissingName(id.to_string())
        })
    }

    pub fn save_name(&self, name: &AuctionedName) -> ProjectionResult<()> {
        Ok(self.storage.store_name(self.txn, name)?)
    }

    // ========== Deeds ==========

    pub fn load_deed(&self, id: &str) -> ProjectionResult<Option<Deed>> {
        Ok(self.storage.get_deed_txn(self.txn, id)?)
    }

    /// Load the deed a name points at; both the reference and the record
    /// must exist
    pub fn require_deed_of(&self, name: &AuctionedName) -> ProjectionResult<Deed> {
        let deed_id = name
            .deed
            .as_deref()
            .ok_or_else(|| ProjectionError::NameWithoutDeed(name.id.clone()))?;

        self.load_deed(deed_id)?.ok_or_else(|| {
            tracing::error!(name = %name.id, deed = %deed_id, "Name references unknown deed");
            ProjectionError::MissingDeed {
                name: name.id.clone(),
                deed: deed_id.to_string(),
            }
        })
    }

    pub fn save_deed(&self, deed: &Deed) -> ProjectionResult<()> {
        Ok(self.storage.store_deed(self.txn, deed)?)
    }

    // ========== Accounts ==========

    /// Upsert an account; existing accounts are rewritten unchanged
    pub fn ensure_account(&self, id: &str) -> ProjectionResult<()> {
        Ok(self.storage.store_account(self.txn, &Account::new(id))?)
    }

    // ========== Contract reads ==========

    pub fn resolve_deed_address(
        &self,
        registrar: &Address,
        label: &H256,
        block_number: u64,
    ) -> ProjectionResult<Address> {
        Ok(self.gateway.deed_address(registrar, label, block_number)?)
    }
}
