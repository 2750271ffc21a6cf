//! DeedClosed event applier
//!
//! Closing releases the deed's locked value. The record stays with no owner
//! and a zero value.

use crate::projection::traits::{EventApplier, ProjectionContext, ProjectionResult};
use shared::registrar::{EventPayload, RegistrarEvent, StatCounter};

/// DeedClosed applier
pub struct DeedClosedApplier;

impl EventApplier for DeedClosedApplier {
    fn apply(&self, ctx: &ProjectionContext<'_>, event: &RegistrarEvent) -> ProjectionResult<()> {
        if let EventPayload::DeedClosed = &event.payload {
            let deed_id = event.address.to_hex();
            let Some(mut deed) = ctx.load_deed(&deed_id)? else {
                tracing::debug!(deed = %deed_id, "Close of unknown deed, ignoring");
                return Ok(());
            };

            let stats = ctx.stats();
            stats.decrement(StatCounter::Deeds)?;
            stats.increment(StatCounter::Closed)?;
            stats.subtract_current_value(deed.value)?;

            tracing::debug!(deed = %deed_id, value = %deed.value, "Deed closed");

            deed.owner = None;
            deed.value = 0;
            ctx.save_deed(&deed)?;
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
    fn test_close_of_unknown_deed_is_noop() {
        let harness = Harness::new(StaticGateway::new());
        harness
            .apply(&deed_event(1, addr(0xd9), EventPayload::DeedClosed))
            .unwrap();

        assert!(harness.deed(&addr(0xd9)).is_none());
        assert_eq!(harness.stats(), StatsEntity::default());
    }

    #[test]
    fn test_close_releases_locked_value() {
        let harness = Harness::new(StaticGateway::new().with_deed(label(1), addr(0xd1)));
        harness.apply(&auction_started(1, label(1), 100)).unwrap();
        harness
            .apply(&bid_revealed(2, label(1), addr(0xa), 50, BidStatus::Won))
            .unwrap();

        harness
            .apply(&deed_event(3, addr(0xd1), EventPayload::DeedClosed))
            .unwrap();

        let deed = harness.deed(&addr(0xd1)).unwrap();
        assert_eq!(deed.owner, None);
        assert_eq!(deed.value, 0);

        let stats = harness.stats();
        assert_eq!(stats.num_of_deeds, 0);
        assert_eq!(stats.num_closed, 1);
        assert_eq!(stats.current_value, 0);
        assert_eq!(stats.accum_value, 50);

        // Name still points at the closed deed
        assert_eq!(
            harness.name(&label(1)).unwrap().deed,
            Some(addr(0xd1).to_hex())
        );
    }
}
