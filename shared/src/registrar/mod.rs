//! Auction registrar projection types
//!
//! - Events: on-chain facts delivered in block order
//! - Entities: state projected from the event stream

pub mod entity;
pub mod event;

// Re-exports
pub use entity::{
    Account, AuctionedName, Deed, NameState, STATS_KEY, StatCounter, StatsEntity,
};
pub use event::{
    BidStatus, EventPayload, EventPosition, InvalidBidStatus, RegistrarEvent, RegistrarEventType,
};
