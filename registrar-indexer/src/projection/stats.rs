//! StatsAggregator - the singleton aggregate record
//!
//! The record is created with all counters at zero the first time it is
//! touched and saved after every operation. Callers pass the exact delta of
//! each mutation; the aggregator does no cross-checking of its own.

use redb::WriteTransaction;
use shared::registrar::{StatCounter, StatsEntity};

use super::storage::{EntityStorage, StorageResult};

/// Stats handle bound to one write transaction
#[derive(Clone, Copy)]
pub struct StatsAggregator<'a> {
    txn: &'a WriteTransaction,
    storage: &'a EntityStorage,
}

impl<'a> StatsAggregator<'a> {
    pub fn new(txn: &'a WriteTransaction, storage: &'a EntityStorage) -> Self {
        Self { txn, storage }
    }

    /// Current record, or a zeroed one if none has been written yet
    pub fn load_or_init(&self) -> StorageResult<StatsEntity> {
        Ok(self.storage.get_stats_txn(self.txn)?.unwrap_or_default())
    }

    fn update(&self, f: impl FnOnce(&mut StatsEntity)) -> StorageResult<()> {
        let mut stats = self.load_or_init()?;
        f(&mut stats);
        self.storage.store_stats(self.txn, &stats)
    }

    pub fn increment(&self, counter: StatCounter) -> StorageResult<()> {
        self.update(|stats| *stats.counter_mut(counter) += 1)
    }

    /// Saturates at zero
    pub fn decrement(&self, counter: StatCounter) -> StorageResult<()> {
        self.update(|stats| {
            let value = stats.counter_mut(counter);
            if *value == 0 {
                tracing::warn!(counter = ?counter, "Stats counter decremented below zero, clamping");
            }
            *value = value.saturating_sub(1);
        })
    }

    pub fn add_accum_value(&self, amount: u128) -> StorageResult<()> {
        self.update(|stats| stats.accum_value = stats.accum_value.saturating_add(amount))
    }

    pub fn add_current_value(&self, amount: u128) -> StorageResult<()> {
        self.update(|stats| stats.current_value = stats.current_value.saturating_add(amount))
    }

    /// Saturates at zero
    pub fn subtract_current_value(&self, amount: u128) -> StorageResult<()> {
        self.update(|stats| {
            if amount > stats.current_value {
                tracing::warn!(
                    current_value = %stats.current_value,
                    amount = %amount,
                    "Locked value would drop below zero, clamping"
                );
            }
            stats.current_value = stats.current_value.saturating_sub(amount);
        })
    }
}
