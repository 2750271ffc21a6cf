//! Event applier implementations
//!
//! Each applier implements the `EventApplier` trait and handles one event
//! kind. Appliers keep no state of their own: everything they read or write
//! goes through the `ProjectionContext`.

use enum_dispatch::enum_dispatch;

use shared::registrar::{EventPayload, RegistrarEvent};

use super::traits::{EventApplier, ProjectionContext, ProjectionResult};

mod auction_started;
mod bid_revealed;
mod deed_closed;
mod deed_transferred;
mod hash_invalidated;
mod hash_registered;
mod hash_released;

pub use auction_started::AuctionStartedApplier;
pub use bid_revealed::BidRevealedApplier;
pub use deed_closed::DeedClosedApplier;
pub use deed_transferred::DeedTransferredApplier;
pub use hash_invalidated::HashInvalidatedApplier;
pub use hash_registered::HashRegisteredApplier;
pub use hash_released::HashReleasedApplier;

/// EventAction enum - dispatches to concrete applier implementations
#[enum_dispatch(EventApplier)]
pub enum EventAction {
    AuctionStarted(AuctionStartedApplier),
    BidRevealed(BidRevealedApplier),
    HashRegistered(HashRegisteredApplier),
    HashReleased(HashReleasedApplier),
    HashInvalidated(HashInvalidatedApplier),
    DeedTransferred(DeedTransferredApplier),
    DeedClosed(DeedClosedApplier),
}

/// Convert RegistrarEvent reference to EventAction
///
/// This is the ONLY place with a match on EventPayload kinds.
impl From<&RegistrarEvent> for EventAction {
    fn from(event: &RegistrarEvent) -> Self {
        match &event.payload {
            EventPayload::AuctionStarted { .. } => {
                EventAction::AuctionStarted(AuctionStartedApplier)
            }
            EventPayload::BidRevealed { .. } => EventAction::BidRevealed(BidRevealedApplier),
            EventPayload::HashRegistered { .. } => {
                EventAction::HashRegistered(HashRegisteredApplier)
            }
            EventPayload::HashReleased { .. } => EventAction::HashReleased(HashReleasedApplier),
            EventPayload::HashInvalidated { .. } => {
                EventAction::HashInvalidated(HashInvalidatedApplier)
            }
            EventPayload::DeedOwnerChanged { .. } => {
                EventAction::DeedTransferred(DeedTransferredApplier)
            }
            EventPayload::DeedClosed => EventAction::DeedClosed(DeedClosedApplier),
        }
    }
}

/// Apply one event through its applier
pub fn apply_event(ctx: &ProjectionContext<'_>, event: &RegistrarEvent) -> ProjectionResult<()> {
    EventAction::from(event).apply(ctx, event)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::projection::gateway::StaticGateway;
    use crate::projection::storage::EntityStorage;
    use shared::codec::{Address, H256};
    use shared::registrar::{AuctionedName, BidStatus, Deed, StatsEntity};

    pub fn label(n: u8) -> H256 {
        H256::new([n; 32])
    }

    pub fn addr(n: u8) -> Address {
        Address::new([n; 20])
    }

    pub fn registrar() -> Address {
        addr(0xee)
    }

    pub fn event(block_number: u64, payload: EventPayload) -> RegistrarEvent {
        RegistrarEvent::new(block_number, 0, 1_000 + block_number, registrar(), payload)
    }

    pub fn deed_event(block_number: u64, deed: Address, payload: EventPayload) -> RegistrarEvent {
        RegistrarEvent::new(block_number, 0, 1_000 + block_number, deed, payload)
    }

    pub fn auction_started(block_number: u64, hash: H256, registration_date: u64) -> RegistrarEvent {
        event(
            block_number,
            EventPayload::AuctionStarted {
                hash,
                registration_date,
            },
        )
    }

    pub fn bid_revealed(
        block_number: u64,
        hash: H256,
        owner: Address,
        value: u128,
        status: BidStatus,
    ) -> RegistrarEvent {
        event(
            block_number,
            EventPayload::BidRevealed {
                hash,
                owner,
                value,
                status,
            },
        )
    }

    /// In-memory store plus static gateway; commits on success, drops the
    /// transaction on error
    pub struct Harness {
        pub storage: EntityStorage,
        pub gateway: StaticGateway,
    }

    impl Harness {
        pub fn new(gateway: StaticGateway) -> Self {
            Self {
                storage: EntityStorage::open_in_memory().unwrap(),
                gateway,
            }
        }

        pub fn apply(&self, event: &RegistrarEvent) -> ProjectionResult<()> {
            let txn = self.storage.begin_write().unwrap();
            {
                let ctx = ProjectionContext::new(&txn, &self.storage, &self.gateway);
                apply_event(&ctx, event)?;
            }
            txn.commit().unwrap();
            Ok(())
        }

        pub fn stats(&self) -> StatsEntity {
            self.storage.get_stats().unwrap().unwrap_or_default()
        }

        pub fn name(&self, hash: &H256) -> Option<AuctionedName> {
            self.storage.get_name(&hash.to_hex()).unwrap()
        }

        pub fn deed(&self, address: &Address) -> Option<Deed> {
            self.storage.get_deed(&address.to_hex()).unwrap()
        }
    }
}
