use super::super::storage::StorageError;
use super::super::traits::ProjectionError;
use thiserror::Error;

/// Manager errors
///
/// Every variant is fatal for the replay: the event's transaction was not
/// committed and the cursor did not move.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Projection failed at block {block_number} log {log_index}: {source}")]
    Projection {
        block_number: u64,
        log_index: u64,
        #[source]
        source: ProjectionError,
    },
}

impl ManagerError {
    /// True when the event referenced state the projection never saw
    /// (missing name or deed), as opposed to an infrastructure failure
    pub fn is_missing_precondition(&self) -> bool {
        matches!(
            self,
            ManagerError::Projection {
                source: ProjectionError::MissingName(_)
                    | ProjectionError::NameWithoutDeed(_)
                    | ProjectionError::MissingDeed { .. },
                ..
            }
        )
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
