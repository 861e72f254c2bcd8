use std::time::Duration;
use crate::core::error::EngineError;
use crate::models::ParticipantPatch;
use crate::services::{bounded_write, ParticipantStore};

/// Clears every participant's votes and matches in one bulk write
///
/// There is no partial success: on failure, timeouts included, no
/// assumption can be made about which records changed. The store does not guarantee all-or-nothing, so
/// the reset is best-effort and can simply be repeated.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminResetController;

impl AdminResetController {
    pub fn new() -> Self {
        Self
    }

    pub async fn reset_all(
        &self,
        store: &dyn ParticipantStore,
        timeout: Duration,
    ) -> Result<(), EngineError> {
        tracing::warn!("Resetting all votes and matches");

        let reset = ParticipantPatch::reset();
        match bounded_write("all participants", timeout, store.update_all(&reset)).await {
            Ok(()) => {
                tracing::info!("All votes and matches cleared");
                Ok(())
            }
            Err(source) => {
                tracing::error!("Bulk reset failed: {}", source);
                Err(EngineError::BulkResetFailure(source))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, Participant, Role};
    use crate::services::MemoryStore;

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let mut a = Participant::new("a", Gender::Male, Role::User);
        a.votes_given = vec!["b".into()];
        a.matches = vec!["b".into()];
        let mut b = Participant::new("b", Gender::Female, Role::User);
        b.votes_given = vec!["a".into()];
        b.matches = vec!["a".into()];
        let store = MemoryStore::new(vec![a, b]);

        AdminResetController::new()
            .reset_all(&store, Duration::from_secs(1))
            .await
            .unwrap();

        for p in store.get_all().await.unwrap() {
            assert!(p.votes_given.is_empty());
            assert!(p.matches.is_empty());
        }
    }

    #[tokio::test]
    async fn test_bulk_failure_reported() {
        let store = MemoryStore::new(vec![Participant::new("a", Gender::Male, Role::User)]);
        store.fail_bulk_writes(true).await;

        let result = AdminResetController::new()
            .reset_all(&store, Duration::from_secs(1))
            .await;

        assert!(matches!(result, Err(EngineError::BulkResetFailure(_))));
    }

    #[tokio::test]
    async fn test_bulk_timeout_is_bulk_failure() {
        let store = MemoryStore::new(vec![Participant::new("a", Gender::Male, Role::User)]);
        store.delay_bulk_writes(Some(Duration::from_secs(2))).await;

        let result = AdminResetController::new()
            .reset_all(&store, Duration::from_millis(100))
            .await;

        match result {
            Err(EngineError::BulkResetFailure(source)) => {
                assert!(matches!(source, crate::services::StoreError::Timeout { .. }));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
