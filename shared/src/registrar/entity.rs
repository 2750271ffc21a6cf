//! Projected entities
//!
//! Each entity is stored under its string key and overwritten in place; the
//! projection never deletes records.

use serde::{Deserialize, Serialize};

/// Key of the singleton stats record
pub const STATS_KEY: &str = "";

/// Account that has placed a winning bid. Existence is the only attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Lowercase hex address
    pub id: String,
}

impl Account {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Auction state of a name
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NameState {
    #[default]
    Auction,
    Finalized,
    Released,
    Forbidden,
}

/// Name being auctioned, keyed by its label hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionedName {
    /// Lowercase hex label hash
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub registration_date: Option<u64>,
    pub bid_count: u32,
    pub state: NameState,
    /// Fully-qualified domain hash, set at finalization
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub release_date: Option<u64>,
    /// Key of the current highest bid's deed
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub deed: Option<String>,
    /// Highest losing bid observed
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub second_bid: Option<u128>,
}

impl AuctionedName {
    /// Blank record in the given state.
    ///
    /// Release and invalidation build on this rather than on the stored
    /// record, so earlier bid count, deed and second bid are discarded.
    pub fn fresh(id: impl Into<String>, state: NameState) -> Self {
        Self {
            id: id.into(),
            registration_date: None,
            bid_count: 0,
            state,
            domain: None,
            release_date: None,
            deed: None,
            second_bid: None,
        }
    }
}

/// Deed contract holding a locked bid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deed {
    /// Lowercase hex deed contract address
    pub id: String,
    pub value: u128,
    /// Owning account key, `None` once closed
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub owner: Option<String>,
}

impl Deed {
    pub fn new(id: impl Into<String>, value: u128, owner: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value,
            owner: Some(owner.into()),
        }
    }

    /// Whether the deed's value counts towards locked value
    pub fn is_open(&self) -> bool {
        self.owner.is_some()
    }
}

/// Global aggregate statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsEntity {
    pub num_of_deeds: u64,
    pub num_auctioned: u64,
    pub num_finalised: u64,
    pub num_released: u64,
    pub num_transferred: u64,
    pub num_closed: u64,
    pub num_forbidden: u64,
    /// Lifetime sum of winning bid values
    pub accum_value: u128,
    /// Sum of values still locked in open deeds
    pub current_value: u128,
}

/// Named counter of [`StatsEntity`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatCounter {
    Deeds,
    Auctioned,
    Finalised,
    Released,
    Transferred,
    Closed,
    Forbidden,
}

impl StatsEntity {
    pub fn counter(&self, counter: StatCounter) -> u64 {
        match counter {
            StatCounter::Deeds => self.num_of_deeds,
            StatCounter::Auctioned => self.num_auctioned,
            StatCounter::Finalised => self.num_finalised,
            StatCounter::Released => self.num_released,
            StatCounter::Transferred => self.num_transferred,
            StatCounter::Closed => self.num_closed,
            StatCounter::Forbidden => self.num_forbidden,
        }
    }

    pub fn counter_mut(&mut self, counter: StatCounter) -> &mut u64 {
        match counter {
            StatCounter::Deeds => &mut self.num_of_deeds,
            StatCounter::Auctioned => &mut self.num_auctioned,
            StatCounter::Finalised => &mut self.num_finalised,
            StatCounter::Released => &mut self.num_released,
            StatCounter::Transferred => &mut self.num_transferred,
            StatCounter::Closed => &mut self.num_closed,
            StatCounter::Forbidden => &mut self.num_forbidden,
        }
    }
}
