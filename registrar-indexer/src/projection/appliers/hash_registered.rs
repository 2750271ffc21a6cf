//! HashRegistered event applier
//!
//! Finalizes the auction: the winner pays the second-highest price, so the
//! deed's value drops to `value` and the refund leaves the locked total.

use crate::projection::namehash::domain_hash;
use crate::projection::traits::{EventApplier, ProjectionContext, ProjectionResult};
use shared::registrar::{EventPayload, NameState, RegistrarEvent, StatCounter};

/// HashRegistered applier
pub struct HashRegisteredApplier;

impl EventApplier for HashRegisteredApplier {
    fn apply(&self, ctx: &ProjectionContext<'_>, event: &RegistrarEvent) -> ProjectionResult<()> {
        if let EventPayload::HashRegistered {
            hash,
            registration_date,
            value,
        } = &event.payload
        {
            let mut name = ctx.require_name(&hash.to_hex())?;
            let mut deed = ctx.require_deed_of(&name)?;

            name.registration_date = Some(*registration_date);
            name.domain = Some(domain_hash(hash).to_hex());
            name.state = NameState::Finalized;
            ctx.save_name(&name)?;

            let previous_value = deed.value;
            deed.value = *value;
            ctx.save_deed(&deed)?;

            let stats = ctx.stats();
            stats.increment(StatCounter::Finalised)?;
            // Only open deeds count toward currentValue
            if !deed.is_open() {
                tracing::warn!(
                    name = %name.id,
                    deed = %deed.id,
                    "Finalized name references a closed deed, locked total unchanged"
                );
            } else if previous_value >= *value {
                stats.subtract_current_value(previous_value - value)?;
            } else {
                stats.add_current_value(value - previous_value)?;
            }

            tracing::debug!(
                name = %name.id,
                domain = name.domain.as_deref().unwrap_or_default(),
                deed = %deed.id,
                previous_value = %previous_value,
                value = %value,
                "Name finalized"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::projection::appliers::test_support::*;
    use crate::projection::gateway::StaticGateway;
    use crate::projection::namehash::domain_hash;
    use crate::projection::traits::ProjectionError;
    use shared::codec::H256;
    use shared::registrar::{BidStatus, EventPayload, NameState};

    fn registered(block_number: u64, hash: H256, value: u128) -> shared::registrar::RegistrarEvent {
        event(
            block_number,
            EventPayload::HashRegistered {
                hash,
                registration_date: 200,
                value,
            },
        )
    }

    fn won(value: u128) -> Harness {
        let harness = Harness::new(StaticGateway::new().with_deed(label(1), addr(0xd1)));
        harness.apply(&auction_started(1, label(1), 100)).unwrap();
        harness
            .apply(&bid_revealed(2, label(1), addr(0xa), value, BidStatus::Won))
            .unwrap();
        harness
    }

    #[test]
    fn test_finalize_with_equal_value_keeps_locked_total() {
        let harness = won(80);
        harness.apply(&registered(3, label(1), 80)).unwrap();

        let name = harness.name(&label(1)).unwrap();
        assert_eq!(name.state, NameState::Finalized);
        assert_eq!(name.registration_date, Some(200));
        assert_eq!(name.domain, Some(domain_hash(&label(1)).to_hex()));

        let stats = harness.stats();
        assert_eq!(stats.num_finalised, 1);
        assert_eq!(stats.current_value, 80);
        assert_eq!(stats.accum_value, 80);
    }

    #[test]
    fn test_finalize_refund_reduces_locked_total() {
        let harness = won(100);
        harness.apply(&registered(3, label(1), 60)).unwrap();

        assert_eq!(harness.deed(&addr(0xd1)).unwrap().value, 60);
        let stats = harness.stats();
        assert_eq!(stats.current_value, 60);
        // Lifetime total keeps the bid as placed
        assert_eq!(stats.accum_value, 100);
    }

    #[test]
    fn test_finalize_with_higher_value_raises_locked_total() {
        let harness = won(40);
        harness.apply(&registered(3, label(1), 55)).unwrap();
        assert_eq!(harness.stats().current_value, 55);
    }

    #[test]
    fn test_finalize_closed_deed_keeps_locked_total() {
        let harness = won(50);
        harness
            .apply(&deed_event(3, addr(0xd1), EventPayload::DeedClosed))
            .unwrap();
        harness.apply(&registered(4, label(1), 30)).unwrap();

        let deed = harness.deed(&addr(0xd1)).unwrap();
        assert_eq!(deed.value, 30);
        assert_eq!(deed.owner, None);

        let stats = harness.stats();
        assert_eq!(stats.num_finalised, 1);
        assert_eq!(stats.num_of_deeds, 0);
        assert_eq!(stats.current_value, 0);
    }

    #[test]
    fn test_finalize_unknown_name_is_a_fault() {
        let harness = Harness::new(StaticGateway::new());
        let result = harness.apply(&registered(1, label(1), 10));
        assert!(matches!(result, Err(ProjectionError::MissingName(_))));
        assert_eq!(harness.stats().num_finalised, 0);
    }

    #[test]
    fn test_finalize_without_deed_is_a_fault() {
        let harness = Harness::new(StaticGateway::new());
        harness.apply(&auction_started(1, label(1), 100)).unwrap();

        let result = harness.apply(&registered(2, label(1), 10));
        assert!(matches!(result, Err(ProjectionError::NameWithoutDeed(_))));

        // Aborted event leaves the name in AUCTION
        assert_eq!(harness.name(&label(1)).unwrap().state, NameState::Auction);
    }
}
