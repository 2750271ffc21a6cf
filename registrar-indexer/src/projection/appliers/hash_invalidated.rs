//! HashInvalidated event applier
//!
//! Same fresh-record overwrite as release: the stored bid history is not
//! carried into the FORBIDDEN record.

use crate::projection::traits::{EventApplier, ProjectionContext, ProjectionResult};
use shared::registrar::{AuctionedName, EventPayload, NameState, RegistrarEvent, StatCounter};

/// HashInvalidated applier
pub struct HashInvalidatedApplier;

impl EventApplier for HashInvalidatedApplier {
    fn apply(&self, ctx: &ProjectionContext<'_>, event: &RegistrarEvent) -> ProjectionResult<()> {
        if let EventPayload::HashInvalidated { hash } = &event.payload {
            let name = AuctionedName::fresh(hash.to_hex(), NameState::Forbidden);
            ctx.save_name(&name)?;

            ctx.stats().increment(StatCounter::Forbidden)?;

            tracing::debug!(name = %name.id, "Name invalidated");
        }
        Ok(())
    }
}
