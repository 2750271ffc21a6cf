//! HashReleased event applier
//!
//! Builds a fresh RELEASED record instead of loading the stored one, so a
//! released name loses its bid count, deed reference and second bid. The
//! deed itself is untouched; its value leaves the locked total only when the
//! deed contract reports `DeedClosed`.

use crate::projection::traits::{EventApplier, ProjectionContext, ProjectionResult};
use shared::registrar::{AuctionedName, EventPayload, NameState, RegistrarEvent, StatCounter};

/// HashReleased applier
pub struct HashReleasedApplier;

impl EventApplier for HashReleasedApplier {
    fn apply(&self, ctx: &ProjectionContext<'_>, event: &RegistrarEvent) -> ProjectionResult<()> {
        if let EventPayload::HashReleased { hash } = &event.payload {
            let mut name = AuctionedName::fresh(hash.to_hex(), NameState::Released);
            name.release_date = Some(event.block_timestamp);
            ctx.save_name(&name)?;

            ctx.stats().increment(StatCounter::Released)?;

            tracing::debug!(name = %name.id, release_date = event.block_timestamp, "Name released");
        }
        Ok(())
    }
}
