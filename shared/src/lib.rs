//! Shared types for the registrar indexer
//!
//! Byte codec primitives and the registrar domain model (events and
//! projected entities).

pub mod codec;
pub mod registrar;

// Re-exports
pub use codec::{Address, CodecError, H256};
pub use serde::{Deserialize, Serialize};
