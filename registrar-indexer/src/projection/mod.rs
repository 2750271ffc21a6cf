//! Auction registrar projection
//!
//! Folds registrar and deed contract events into entity state:
//!
//! - **appliers**: one `EventApplier` per event kind
//! - **manager**: `ProjectionManager`, one transaction per event with an
//!   exactly-once cursor
//! - **storage**: redb tables for accounts, names, deeds, stats and the cursor
//! - **stats**: `StatsAggregator`, the singleton aggregate record
//! - **gateway**: deed address lookups (`entries(bytes32)`)
//! - **feed**: JSON-lines event source
//!
//! # Data Flow
//!
//! ```text
//! EventFeed → ProjectionManager → EventAction::apply → EntityStorage (redb)
//!                    ↓                    ↓
//!                Broadcast         ContractGateway
//! ```

// `traits` carries the `#[enum_dispatch]` trait and must precede `appliers`
pub mod traits;

pub mod appliers;
pub mod feed;
pub mod gateway;
pub mod manager;
pub mod namehash;
pub mod stats;
pub mod storage;

// Re-exports
pub use feed::{EventFeed, FeedError, FeedResult};
pub use gateway::{ContractGateway, GatewayError, JsonRpcGateway, StaticGateway};
pub use manager::{ManagerError, ManagerResult, ProcessOutcome, ProjectionManager};
pub use namehash::{ROOT_NODE, domain_hash, keccak256};
pub use stats::StatsAggregator;
pub use storage::{EntityStorage, StorageError};
pub use traits::{EventApplier, ProjectionContext, ProjectionError};

// Re-export shared types for convenience
pub use shared::registrar::{
    Account, AuctionedName, BidStatus, Deed, EventPayload, NameState, RegistrarEvent,
    RegistrarEventType, StatsEntity,
};
