//! Registrar events - immutable on-chain facts delivered in block order

use crate::codec::{Address, H256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of an event in the chain: `(block_number, log_index)`
///
/// Positions are totally ordered; the projection cursor stores the last
/// applied position.
pub type EventPosition = (u64, u64);

/// Registrar or deed contract event with its block context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrarEvent {
    /// Block that emitted the log
    pub block_number: u64,
    /// Log index within the block
    pub log_index: u64,
    /// Block timestamp (Unix seconds)
    pub block_timestamp: u64,
    /// Emitting contract: the registrar for auction events, the deed itself
    /// for `DeedOwnerChanged` / `DeedClosed`
    pub address: Address,
    /// Event payload
    pub payload: EventPayload,
}

impl RegistrarEvent {
    pub fn new(
        block_number: u64,
        log_index: u64,
        block_timestamp: u64,
        address: Address,
        payload: EventPayload,
    ) -> Self {
        Self {
            block_number,
            log_index,
            block_timestamp,
            address,
            payload,
        }
    }

    pub fn position(&self) -> EventPosition {
        (self.block_number, self.log_index)
    }

    pub fn event_type(&self) -> RegistrarEventType {
        self.payload.event_type()
    }
}

/// Event type enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrarEventType {
    // Registrar
    AuctionStarted,
    BidRevealed,
    HashRegistered,
    HashReleased,
    HashInvalidated,

    // Deed
    DeedOwnerChanged,
    DeedClosed,
}

impl fmt::Display for RegistrarEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrarEventType::AuctionStarted => write!(f, "AUCTION_STARTED"),
            RegistrarEventType::BidRevealed => write!(f, "BID_REVEALED"),
            RegistrarEventType::HashRegistered => write!(f, "HASH_REGISTERED"),
            RegistrarEventType::HashReleased => write!(f, "HASH_RELEASED"),
            RegistrarEventType::HashInvalidated => write!(f, "HASH_INVALIDATED"),
            RegistrarEventType::DeedOwnerChanged => write!(f, "DEED_OWNER_CHANGED"),
            RegistrarEventType::DeedClosed => write!(f, "DEED_CLOSED"),
        }
    }
}

/// Event payload variants
///
/// Wei amounts travel as decimal strings so that values above 2^53 survive
/// JSON consumers; plain JSON integers are accepted on input as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    // ========== Registrar ==========
    AuctionStarted {
        hash: H256,
        registration_date: u64,
    },

    BidRevealed {
        /// Label hash, except for `BidStatus::Cancelled` where the registrar
        /// reports the sealed bid hash instead
        hash: H256,
        owner: Address,
        #[serde(with = "wei")]
        value: u128,
        status: BidStatus,
    },

    HashRegistered {
        hash: H256,
        registration_date: u64,
        #[serde(with = "wei")]
        value: u128,
    },

    HashReleased {
        hash: H256,
    },

    HashInvalidated {
        hash: H256,
    },

    // ========== Deed ==========
    DeedOwnerChanged {
        new_owner: Address,
    },

    DeedClosed,
}

impl EventPayload {
    pub fn event_type(&self) -> RegistrarEventType {
        match self {
            EventPayload::AuctionStarted { .. } => RegistrarEventType::AuctionStarted,
            EventPayload::BidRevealed { .. } => RegistrarEventType::BidRevealed,
            EventPayload::HashRegistered { .. } => RegistrarEventType::HashRegistered,
            EventPayload::HashReleased { .. } => RegistrarEventType::HashReleased,
            EventPayload::HashInvalidated { .. } => RegistrarEventType::HashInvalidated,
            EventPayload::DeedOwnerChanged { .. } => RegistrarEventType::DeedOwnerChanged,
            EventPayload::DeedClosed => RegistrarEventType::DeedClosed,
        }
    }
}

/// Outcome of revealing a sealed bid, as reported by the registrar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum BidStatus {
    /// Harmless invalid bid
    Invalid = 0,
    /// Bid revealed after the reveal period
    LateReveal = 1,
    /// New highest bid
    Won = 2,
    /// New second-highest bid
    RunnerUp = 3,
    /// Lower than the current second bid
    BelowSecond = 4,
    /// Cancelled bid; `hash` is the sealed bid, not a label hash
    Cancelled = 5,
}

impl BidStatus {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<BidStatus> for u8 {
    fn from(status: BidStatus) -> Self {
        status.code()
    }
}

/// Error for unknown bid status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidBidStatus(pub u8);

impl fmt::Display for InvalidBidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid bid status: {}", self.0)
    }
}

impl std::error::Error for InvalidBidStatus {}

impl TryFrom<u8> for BidStatus {
    type Error = InvalidBidStatus;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(BidStatus::Invalid),
            1 => Ok(BidStatus::LateReveal),
            2 => Ok(BidStatus::Won),
            3 => Ok(BidStatus::RunnerUp),
            4 => Ok(BidStatus::BelowSecond),
            5 => Ok(BidStatus::Cancelled),
            _ => Err(InvalidBidStatus(value)),
        }
    }
}

/// Wei amounts as decimal strings (accepts JSON integers on input)
pub mod wei {
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        deserializer.deserialize_any(WeiVisitor)
    }

    struct WeiVisitor;

    impl Visitor<'_> for WeiVisitor {
        type Value = u128;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative wei amount as a decimal string or integer")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
            Ok(u128::from(v))
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<u128, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u128, E> {
            u128::try_from(v).map_err(|_| E::custom(format!("negative wei amount: {v}")))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
            v.parse::<u128>()
                .map_err(|e| E::custom(format!("invalid wei amount {v:?}: {e}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registrar() -> Address {
        Address::new([0x60; 20])
    }

    #[test]
    fn test_bid_status_codes() {
        for code in 0u8..=5 {
            let status = BidStatus::try_from(code).unwrap();
            assert_eq!(status.code(), code);
        }
        assert_eq!(BidStatus::try_from(6), Err(InvalidBidStatus(6)));
    }

    #[test]
    fn test_bid_revealed_json_shape() {
        let json = r#"{
            "block_number": 10,
            "log_index": 2,
            "block_timestamp": 1500000000,
            "address": "0x6060606060606060606060606060606060606060",
            "payload": {
                "type": "BID_REVEALED",
                "hash": "0x1111111111111111111111111111111111111111111111111111111111111111",
                "owner": "0x2222222222222222222222222222222222222222",
                "value": "340282366920938463463374607431768211455",
                "status": 2
            }
        }"#;

        let event: RegistrarEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.position(), (10, 2));
        assert_eq!(event.address, registrar());
        assert_eq!(event.event_type(), RegistrarEventType::BidRevealed);
        match event.payload {
            EventPayload::BidRevealed { value, status, .. } => {
                assert_eq!(value, u128::MAX);
                assert_eq!(status, BidStatus::Won);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn test_wei_accepts_integer_input() {
        let json = r#"{"type":"HASH_REGISTERED","hash":"0x1111111111111111111111111111111111111111111111111111111111111111","registration_date":7,"value":80}"#;
        let payload: EventPayload = serde_json::from_str(json).unwrap();
        assert_eq!(
            payload,
            EventPayload::HashRegistered {
                hash: H256::new([0x11; 32]),
                registration_date: 7,
                value: 80,
            }
        );
    }

    #[test]
    fn test_unknown_bid_status_is_rejected() {
        let json = r#"{"type":"BID_REVEALED","hash":"0x1111111111111111111111111111111111111111111111111111111111111111","owner":"0x2222222222222222222222222222222222222222","value":"1","status":9}"#;
        let result: Result<EventPayload, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_deed_closed_has_no_fields() {
        let event = RegistrarEvent::new(1, 0, 0, registrar(), EventPayload::DeedClosed);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"DEED_CLOSED""#));
        let back: RegistrarEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
