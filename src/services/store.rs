use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use crate::models::{Participant, ParticipantPatch};

/// Errors that can occur when talking to the participant store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A write did not finish before its deadline; whether it landed is unknown
    #[error("write to {target} timed out after {after:?}")]
    Timeout { target: String, after: Duration },

    /// The first write of a pair landed, the second did not
    #[error("pair write applied to {applied} but failed for {missing}: {source}")]
    PartialWrite {
        applied: String,
        missing: String,
        #[source]
        source: Box<StoreError>,
    },
}

/// Record store holding one row per participant
///
/// All writes are field-scoped: a [`ParticipantPatch`] only touches the
/// columns it sets, so concurrent profile edits are never clobbered.
#[async_trait]
pub trait ParticipantStore: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Participant>, StoreError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Participant>, StoreError>;

    async fn update_fields(&self, id: &str, patch: &ParticipantPatch) -> Result<(), StoreError>;

    /// Applies one patch to every record in a single request
    async fn update_all(&self, patch: &ParticipantPatch) -> Result<(), StoreError>;

    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError>;

    /// Writes two related records, each write bounded by `deadline`.
    ///
    /// The default issues two independent updates. If the second fails or
    /// times out after the first succeeded the error is
    /// [`StoreError::PartialWrite`]; a timed out first write is
    /// [`StoreError::Timeout`]. Backends with transactions override this to
    /// write both or neither.
    async fn update_pair(
        &self,
        first: (&str, &ParticipantPatch),
        second: (&str, &ParticipantPatch),
        deadline: Duration,
    ) -> Result<(), StoreError> {
        bounded_write(first.0, deadline, self.update_fields(first.0, first.1)).await?;
        bounded_write(second.0, deadline, self.update_fields(second.0, second.1))
            .await
            .map_err(|e| StoreError::PartialWrite {
                applied: first.0.to_string(),
                missing: second.0.to_string(),
                source: Box::new(e),
            })
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        self.get_all().await.map(|_| true)
    }
}

/// Run one write under `deadline`, reporting an elapsed deadline as
/// [`StoreError::Timeout`] for `target`
pub async fn bounded_write<F>(target: &str, deadline: Duration, write: F) -> Result<(), StoreError>
where
    F: Future<Output = Result<(), StoreError>>,
{
    match tokio::time::timeout(deadline, write).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout {
            target: target.to_string(),
            after: deadline,
        }),
    }
}
