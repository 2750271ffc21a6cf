//! DeedOwnerChanged event applier
//!
//! The deed is identified by the emitting contract. Deeds this projection
//! never saw created (e.g. before indexing began) are ignored.

use crate::projection::traits::{EventApplier, ProjectionContext, ProjectionResult};
use shared::registrar::{EventPayload, RegistrarEvent, StatCounter};

/// DeedOwnerChanged applier
pub struct DeedTransferredApplier;

impl EventApplier for DeedTransferredApplier {
    fn apply(&self, ctx: &ProjectionContext<'_>, event: &RegistrarEvent) -> ProjectionResult<()> {
        if let EventPayload::DeedOwnerChanged { new_owner } = &event.payload {
            let deed_id = event.address.to_hex();
            let Some(mut deed) = ctx.load_deed(&deed_id)? else {
                tracing::debug!(deed = %deed_id, "Transfer of unknown deed, ignoring");
                return Ok(());
            };

            deed.owner = Some(new_owner.to_hex());
            ctx.save_deed(&deed)?;

            ctx.stats().increment(StatCounter::Transferred)?;

            tracing::debug!(deed = %deed_id, new_owner = %new_owner, "Deed transferred");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::projection::appliers::test_support::*;
    use crate::projection::gateway::StaticGateway;
    use shared::registrar::{BidStatus, EventPayload, StatsEntity};

    #[test]
    fn test_transfer_of_unknown_deed_is_noop() {
        let harness = Harness::new(StaticGateway::new());
        harness
            .apply(&deed_event(
                1,
                addr(0xd9),
                EventPayload::DeedOwnerChanged { new_owner: addr(0xb) },
            ))
            .unwrap();

        assert!(harness.deed(&addr(0xd9)).is_none());
        assert_eq!(harness.stats(), StatsEntity::default());
    }

    #[test]
    fn test_transfer_updates_owner_only() {
        let harness = Harness::new(StaticGateway::new().with_deed(label(1), addr(0xd1)));
        harness.apply(&auction_started(1, label(1), 100)).unwrap();
        harness
            .apply(&bid_revealed(2, label(1), addr(0xa), 50, BidStatus::Won))
            .unwrap();

        harness
            .apply(&deed_event(
                3,
                addr(0xd1),
                EventPayload::DeedOwnerChanged { new_owner: addr(0xb) },
            ))
            .unwrap();

        let deed = harness.deed(&addr(0xd1)).unwrap();
        assert_eq!(deed.owner, Some(addr(0xb).to_hex()));
        assert_eq!(deed.value, 50);

        let stats = harness.stats();
        assert_eq!(stats.num_transferred, 1);
        assert_eq!(stats.current_value, 50);
    }
}
