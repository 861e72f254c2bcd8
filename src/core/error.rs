use thiserror::Error;
use crate::services::StoreError;

/// Failures of a voting engine operation
///
/// Validation failures (`QuotaExceeded`, `SelfVote`, `NotEligible`) are
/// raised before any store call. A repeated vote is not an error.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("vote quota of {quota} already used")]
    QuotaExceeded { quota: usize },

    #[error("participants cannot vote for themselves")]
    SelfVote,

    #[error("not eligible to vote: {0}")]
    NotEligible(String),

    #[error("participant not found: {0}")]
    ParticipantNotFound(String),

    #[error("participant store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),

    #[error("participant store timed out during {operation}")]
    StoreTimeout { operation: &'static str },

    /// One side of a match was written, the other was not
    #[error("match recorded for {recorded} but not for {missing}: {source}")]
    AsymmetricMatch {
        recorded: String,
        missing: String,
        #[source]
        source: StoreError,
    },

    #[error("bulk reset failed, record state unknown: {0}")]
    BulkResetFailure(#[source] StoreError),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        EngineError::StoreUnavailable(err)
    }
}

impl EngineError {
    /// Errors caused by the caller rather than the store
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            EngineError::QuotaExceeded { .. }
                | EngineError::SelfVote
                | EngineError::NotEligible(_)
                | EngineError::ParticipantNotFound(_)
        )
    }
}
