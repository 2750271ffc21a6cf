//! Sequential replay of an event feed into the projection

use crate::projection::{EventFeed, FeedError, ManagerError, ProcessOutcome, ProjectionManager};
use std::io::BufRead;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Manager(#[from] ManagerError),
}

/// Counts of a finished replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub applied: u64,
    pub duplicates: u64,
}

/// Feed every event to the manager in order, stopping at the first error
///
/// Events before the failing one stay committed; rerunning the same feed
/// skips them as duplicates.
pub fn replay<R: BufRead>(
    manager: &ProjectionManager,
    reader: R,
) -> Result<ReplaySummary, ReplayError> {
    let mut summary = ReplaySummary::default();

    for event in EventFeed::new(reader) {
        let event = event?;
        match manager.process_event(&event)? {
            ProcessOutcome::Applied => summary.applied += 1,
            ProcessOutcome::Duplicate => summary.duplicates += 1,
        }

        if summary.applied > 0 && summary.applied % 10_000 == 0 {
            tracing::info!(
                applied = summary.applied,
                block_number = event.block_number,
                "Replay progress"
            );
        }
    }

    Ok(summary)
}
