//! AuctionStarted event applier
//!
//! Opens the auction for a label hash, replacing whatever was stored under
//! that key before.

use crate::projection::traits::{EventApplier, ProjectionContext, ProjectionResult};
use shared::registrar::{AuctionedName, EventPayload, NameState, RegistrarEvent, StatCounter};

/// AuctionStarted applier
pub struct AuctionStartedApplier;

impl EventApplier for AuctionStartedApplier {
    fn apply(&self, ctx: &ProjectionContext<'_>, event: &RegistrarEvent) -> ProjectionResult<()> {
        if let EventPayload::AuctionStarted {
            hash,
            registration_date,
        } = &event.payload
        {
            let mut name = AuctionedName::fresh(hash.to_hex(), NameState::Auction);
            name.registration_date = Some(*registration_date);
            ctx.save_name(&name)?;

            ctx.stats().increment(StatCounter::Auctioned)?;

            tracing::debug!(name = %name.id, registration_date, "Auction started");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::projection::appliers::test_support::*;
    use crate::projection::gateway::StaticGateway;
    use shared::registrar::{BidStatus, NameState};

    #[test]
    fn test_auction_started_creates_name() {
        let harness = Harness::new(StaticGateway::new());
        harness.apply(&auction_started(1, label(1), 100)).unwrap();

        let name = harness.name(&label(1)).unwrap();
        assert_eq!(name.state, NameState::Auction);
        assert_eq!(name.bid_count, 0);
        assert_eq!(name.registration_date, Some(100));
        assert!(name.deed.is_none());
        assert_eq!(harness.stats().num_auctioned, 1);
    }

    #[test]
    fn test_auction_restart_resets_record() {
        let harness = Harness::new(StaticGateway::new());
        harness.apply(&auction_started(1, label(1), 100)).unwrap();
        harness
            .apply(&bid_revealed(2, label(1), addr(0xa), 5, BidStatus::RunnerUp))
            .unwrap();
        harness.apply(&auction_started(3, label(1), 300)).unwrap();

        let name = harness.name(&label(1)).unwrap();
        assert_eq!(name.bid_count, 0);
        assert_eq!(name.second_bid, None);
        assert_eq!(name.registration_date, Some(300));
        assert_eq!(harness.stats().num_auctioned, 2);
    }
}
