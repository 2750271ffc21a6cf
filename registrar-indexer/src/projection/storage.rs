//! redb-based entity store for the registrar projection
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `accounts` | address | `Account` | Bidders seen winning |
//! | `auctioned_names` | label hash | `AuctionedName` | Auction state per name |
//! | `deeds` | deed address | `Deed` | Locked bid per deed |
//! | `stats` | `""` | `StatsEntity` | Singleton aggregate |
//! | `cursor` | `"position"` | `(block, log_index)` | Last applied event |
//!
//! Values are JSON-serialized. Writes go through a caller-owned
//! [`WriteTransaction`] so one event's entity writes, stats deltas and cursor
//! advance commit together. Loads return `Ok(None)` for absent keys.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::registrar::{Account, AuctionedName, Deed, EventPosition, STATS_KEY, StatsEntity};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Entity table: key = entity id, value = JSON-serialized entity
type EntityTable = TableDefinition<'static, &'static str, &'static [u8]>;

const ACCOUNTS_TABLE: EntityTable = TableDefinition::new("accounts");

const NAMES_TABLE: EntityTable = TableDefinition::new("auctioned_names");

const DEEDS_TABLE: EntityTable = TableDefinition::new("deeds");

const STATS_TABLE: EntityTable = TableDefinition::new("stats");

/// Table for the stream cursor: key = "position", value = (block_number, log_index)
const CURSOR_TABLE: TableDefinition<&str, (u64, u64)> = TableDefinition::new("cursor");

const CURSOR_KEY: &str = "position";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Entity store backed by redb
#[derive(Clone)]
pub struct EntityStorage {
    db: Arc<Database>,
}

impl EntityStorage {
    /// Open or create the database at the given path
    ///
    /// redb commits with `Durability::Immediate` by default: once `commit()`
    /// returns the event's writes are on disk.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ACCOUNTS_TABLE)?;
            let _ = write_txn.open_table(NAMES_TABLE)?;
            let _ = write_txn.open_table(DEEDS_TABLE)?;
            let _ = write_txn.open_table(STATS_TABLE)?;
            let _ = write_txn.open_table(CURSOR_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Generic helpers ==========

    fn put<T: Serialize>(
        txn: &WriteTransaction,
        table: EntityTable,
        key: &str,
        value: &T,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(table)?;
        let bytes = serde_json::to_vec(value)?;
        table.insert(key, bytes.as_slice())?;
        Ok(())
    }

    fn get_txn<T: DeserializeOwned>(
        txn: &WriteTransaction,
        table: EntityTable,
        key: &str,
    ) -> StorageResult<Option<T>> {
        let table = txn.open_table(table)?;
        match table.get(key)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn get<T: DeserializeOwned>(
        &self,
        table: EntityTable,
        key: &str,
    ) -> StorageResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table)?;
        match table.get(key)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn all<T: DeserializeOwned>(&self, table: EntityTable) -> StorageResult<Vec<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table)?;

        let mut out = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            out.push(serde_json::from_slice(value.value())?);
        }
        Ok(out)
    }

    // ========== Accounts ==========

    pub fn store_account(&self, txn: &WriteTransaction, account: &Account) -> StorageResult<()> {
        Self::put(txn, ACCOUNTS_TABLE, &account.id, account)
    }

    pub fn get_account(&self, id: &str) -> StorageResult<Option<Account>> {
        self.get(ACCOUNTS_TABLE, id)
    }

    // ========== Auctioned names ==========

    pub fn store_name(&self, txn: &WriteTransaction, name: &AuctionedName) -> StorageResult<()> {
        Self::put(txn, NAMES_TABLE, &name.id, name)
    }

    pub fn get_name_txn(
        &self,
        txn: &WriteTransaction,
        id: &str,
    ) -> StorageResult<Option<AuctionedName>> {
        Self::get_txn(txn, NAMES_TABLE, id)
    }

    pub fn get_name(&self, id: &str) -> StorageResult<Option<AuctionedName>> {
        self.get(NAMES_TABLE, id)
    }

    pub fn get_all_names(&self) -> StorageResult<Vec<AuctionedName>> {
        self.all(NAMES_TABLE)
    }

    // ========== Deeds ==========

    pub fn store_deed(&self, txn: &WriteTransaction, deed: &Deed) -> StorageResult<()> {
        Self::put(txn, DEEDS_TABLE, &deed.id, deed)
    }

    pub fn get_deed_txn(&self, txn: &WriteTransaction, id: &str) -> StorageResult<Option<Deed>> {
        Self::get_txn(txn, DEEDS_TABLE, id)
    }

    pub fn get_deed(&self, id: &str) -> StorageResult<Option<Deed>> {
        self.get(DEEDS_TABLE, id)
    }

    pub fn get_all_deeds(&self) -> StorageResult<Vec<Deed>> {
        self.all(DEEDS_TABLE)
    }

    // ========== Stats ==========

    pub fn store_stats(&self, txn: &WriteTransaction, stats: &StatsEntity) -> StorageResult<()> {
        Self::put(txn, STATS_TABLE, STATS_KEY, stats)
    }

    pub fn get_stats_txn(&self, txn: &WriteTransaction) -> StorageResult<Option<StatsEntity>> {
        Self::get_txn(txn, STATS_TABLE, STATS_KEY)
    }

    pub fn get_stats(&self) -> StorageResult<Option<StatsEntity>> {
        self.get(STATS_TABLE, STATS_KEY)
    }

    // ========== Cursor ==========

    /// Last applied event position (read-only)
    pub fn get_cursor(&self) -> StorageResult<Option<EventPosition>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CURSOR_TABLE)?;
        Ok(table.get(CURSOR_KEY)?.map(|guard| guard.value()))
    }

    /// Last applied event position (within transaction)
    pub fn get_cursor_txn(&self, txn: &WriteTransaction) -> StorageResult<Option<EventPosition>> {
        let table = txn.open_table(CURSOR_TABLE)?;
        Ok(table.get(CURSOR_KEY)?.map(|guard| guard.value()))
    }

    pub fn set_cursor(&self, txn: &WriteTransaction, position: EventPosition) -> StorageResult<()> {
        let mut table = txn.open_table(CURSOR_TABLE)?;
        table.insert(CURSOR_KEY, position)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::registrar::NameState;

    #[test]
    fn test_missing_keys_load_as_none() {
        let storage = EntityStorage::open_in_memory().unwrap();
        assert!(storage.get_name("0x01").unwrap().is_none());
        assert!(storage.get_deed("0x02").unwrap().is_none());
        assert!(storage.get_account("0x03").unwrap().is_none());
        assert!(storage.get_stats().unwrap().is_none());
        assert!(storage.get_cursor().unwrap().is_none());
    }

    #[test]
    fn test_entity_upsert_overwrites() {
        let storage = EntityStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        storage.store_deed(&txn, &Deed::new("0xd1", 50, "0xa")).unwrap();
        storage.store_deed(&txn, &Deed::new("0xd1", 80, "0xb")).unwrap();
        txn.commit().unwrap();

        let deed = storage.get_deed("0xd1").unwrap().unwrap();
        assert_eq!(deed.value, 80);
        assert_eq!(deed.owner.as_deref(), Some("0xb"));
        assert_eq!(storage.get_all_deeds().unwrap().len(), 1);
    }

    #[test]
    fn test_txn_reads_see_uncommitted_writes() {
        let storage = EntityStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        let name = AuctionedName::fresh("0xaa", NameState::Auction);
        storage.store_name(&txn, &name).unwrap();
        assert_eq!(storage.get_name_txn(&txn, "0xaa").unwrap(), Some(name));
        txn.commit().unwrap();
    }

    #[test]
    fn test_dropped_transaction_leaves_no_trace() {
        let storage = EntityStorage::open_in_memory().unwrap();

        {
            let txn = storage.begin_write().unwrap();
            storage.store_account(&txn, &Account::new("0xa")).unwrap();
            storage.set_cursor(&txn, (1, 0)).unwrap();
            // dropped without commit
        }

        assert!(storage.get_account("0xa").unwrap().is_none());
        assert!(storage.get_cursor().unwrap().is_none());
    }

    #[test]
    fn test_stats_singleton_and_cursor() {
        let storage = EntityStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        let stats = StatsEntity {
            num_auctioned: 3,
            ..Default::default()
        };
        storage.store_stats(&txn, &stats).unwrap();
        storage.set_cursor(&txn, (12, 4)).unwrap();
        assert_eq!(storage.get_cursor_txn(&txn).unwrap(), Some((12, 4)));
        txn.commit().unwrap();

        assert_eq!(storage.get_stats().unwrap(), Some(stats));
        assert_eq!(storage.get_cursor().unwrap(), Some((12, 4)));
    }
}
