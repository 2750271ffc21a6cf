//! BidRevealed event applier
//!
//! Dispatches on the reveal outcome:
//!
//! | Status | Effect |
//! |--------|--------|
//! | `Cancelled` | nothing; `hash` is a sealed bid, not a label |
//! | `Invalid`, `LateReveal` | name re-saved unchanged |
//! | `BelowSecond` | `bid_count += 1` |
//! | `RunnerUp` | `second_bid = value`, `bid_count += 1` |
//! | `Won` | new deed becomes the name's deed, stats take the bid value |

use crate::projection::traits::{
    EventApplier, ProjectionContext, ProjectionError, ProjectionResult,
};
use shared::registrar::{BidStatus, Deed, EventPayload, RegistrarEvent, StatCounter};

/// BidRevealed applier
pub struct BidRevealedApplier;

impl EventApplier for BidRevealedApplier {
    fn apply(&self, ctx: &ProjectionContext<'_>, event: &RegistrarEvent) -> ProjectionResult<()> {
        if let EventPayload::BidRevealed {
            hash,
            owner,
            value,
            status,
        } = &event.payload
        {
            if *status == BidStatus::Cancelled {
                tracing::debug!(bid = %hash, "Cancelled bid, skipping");
                return Ok(());
            }

            let mut name = ctx.require_name(&hash.to_hex())?;

            match status {
                // Cancelled returned above
                BidStatus::Invalid | BidStatus::LateReveal | BidStatus::Cancelled => {}
                BidStatus::BelowSecond => {
                    name.bid_count += 1;
                }
                BidStatus::RunnerUp => {
                    name.second_bid = Some(*value);
                    name.bid_count += 1;
                }
                BidStatus::Won => {
                    let owner_key = owner.to_hex();
                    ctx.ensure_account(&owner_key)?;

                    let deed_address =
                        ctx.resolve_deed_address(&event.address, hash, event.block_number)?;
                    let deed_id = deed_address.to_hex();

                    // Every winning bid locks its value in a new deed contract
                    if let Some(existing) = ctx.load_deed(&deed_id)?
                        && existing.is_open()
                    {
                        tracing::error!(
                            name = %name.id,
                            deed = %deed_id,
                            block_number = event.block_number,
                            "Winning bid resolved to an open deed"
                        );
                        return Err(ProjectionError::DeedAlreadyOpen {
                            name: name.id.clone(),
                            deed: deed_id,
                        });
                    }

                    // The outgoing winner becomes the second bid
                    if name.deed.is_some() {
                        let previous = ctx.require_deed_of(&name)?;
                        name.second_bid = Some(previous.value);
                    }

                    let deed = Deed::new(deed_id, *value, owner_key);
                    ctx.save_deed(&deed)?;

                    name.deed = Some(deed.id.clone());
                    name.bid_count += 1;

                    let stats = ctx.stats();
                    stats.increment(StatCounter::Deeds)?;
                    stats.add_accum_value(*value)?;
                    stats.add_current_value(*value)?;

                    tracing::debug!(
                        name = %name.id,
                        deed = %deed.id,
                        owner = %owner,
                        value = %value,
                        "New winning bid"
                    );
                }
            }

            ctx.save_name(&name)?;
        }
        Ok(())
    }
}
