use super::*;
use crate::projection::gateway::StaticGateway;
use shared::codec::{Address, H256};
use shared::registrar::{BidStatus, EventPayload};

fn create_test_manager(gateway: StaticGateway) -> ProjectionManager {
    let storage = EntityStorage::open_in_memory().unwrap();
    ProjectionManager::with_storage(storage, Arc::new(gateway))
}

fn label(n: u8) -> H256 {
    H256::new([n; 32])
}

fn addr(n: u8) -> Address {
    Address::new([n; 20])
}

fn registrar() -> Address {
    addr(0xee)
}

fn at(block_number: u64, log_index: u64, address: Address, payload: EventPayload) -> RegistrarEvent {
    RegistrarEvent::new(block_number, log_index, 1_000 + block_number, address, payload)
}

fn auction_started(block_number: u64, hash: H256, registration_date: u64) -> RegistrarEvent {
    at(
        block_number,
        0,
        registrar(),
        EventPayload::AuctionStarted {
            hash,
            registration_date,
        },
    )
}

fn bid_revealed(
    block_number: u64,
    hash: H256,
    owner: Address,
    value: u128,
    status: BidStatus,
) -> RegistrarEvent {
    at(
        block_number,
        0,
        registrar(),
        EventPayload::BidRevealed {
            hash,
            owner,
            value,
            status,
        },
    )
}

fn hash_registered(
    block_number: u64,
    hash: H256,
    registration_date: u64,
    value: u128,
) -> RegistrarEvent {
    at(
        block_number,
        0,
        registrar(),
        EventPayload::HashRegistered {
            hash,
            registration_date,
            value,
        },
    )
}

fn hash_released(block_number: u64, hash: H256) -> RegistrarEvent {
    at(block_number, 0, registrar(), EventPayload::HashReleased { hash })
}

fn deed_transferred(block_number: u64, deed: Address, new_owner: Address) -> RegistrarEvent {
    at(
        block_number,
        0,
        deed,
        EventPayload::DeedOwnerChanged { new_owner },
    )
}

fn deed_closed(block_number: u64, deed: Address) -> RegistrarEvent {
    at(block_number, 0, deed, EventPayload::DeedClosed)
}

/// Sum of the values of all open deeds
fn open_deed_total(manager: &ProjectionManager) -> u128 {
    manager
        .get_all_deeds()
        .unwrap()
        .iter()
        .filter(|deed| deed.is_open())
        .map(|deed| deed.value)
        .sum()
}

fn assert_applied(manager: &ProjectionManager, event: &RegistrarEvent) {
    assert_eq!(
        manager.process_event(event).unwrap(),
        ProcessOutcome::Applied,
        "event at {:?} was not applied",
        event.position()
    );
}
