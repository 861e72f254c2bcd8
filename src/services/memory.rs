use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;
use tokio::sync::RwLock;
use crate::models::{Participant, ParticipantPatch, ParticipantRecord};
use crate::services::store::{ParticipantStore, StoreError};

/// In-process participant store
///
/// Keeps registration order, which is the order `get_all` returns and
/// therefore the tie order of rankings. Writes can be made to fail or to
/// stall per id, which is how tests exercise partial pair writes and
/// deadlines. A server using this backend is seeded from a JSON file of
/// storage rows.
#[derive(Debug, Default)]
pub struct MemoryStore {
    participants: RwLock<Vec<Participant>>,
    failing_ids: RwLock<HashSet<String>>,
    fail_bulk: RwLock<bool>,
    write_delays: RwLock<HashMap<String, Duration>>,
    bulk_delay: RwLock<Option<Duration>>,
}

impl MemoryStore {
    pub fn new(participants: Vec<Participant>) -> Self {
        Self {
            participants: RwLock::new(participants),
            ..Default::default()
        }
    }

    /// Registers a participant; an existing record with the same id is replaced in place
    pub async fn insert(&self, participant: Participant) {
        let mut participants = self.participants.write().await;
        match participants.iter_mut().find(|p| p.id == participant.id) {
            Some(existing) => *existing = participant,
            None => participants.push(participant),
        }
    }

    /// Loads storage rows from a JSON array, in file order
    pub async fn seed_from_json(&self, json: &str) -> Result<usize, StoreError> {
        let records: Vec<ParticipantRecord> = serde_json::from_str(json)
            .map_err(|e| StoreError::InvalidRecord(format!("seed data: {}", e)))?;

        let count = records.len();
        for record in records {
            self.insert(Participant::from(record)).await;
        }
        tracing::info!("Seeded {} participants into memory store", count);
        Ok(count)
    }

    pub async fn seed_from_file(&self, path: impl AsRef<Path>) -> Result<usize, StoreError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| StoreError::InvalidRecord(format!("{}: {}", path.display(), e)))?;
        self.seed_from_json(&json).await
    }

    /// Make every write targeting `id` fail until cleared
    pub async fn fail_writes_for(&self, id: &str) {
        self.failing_ids.write().await.insert(id.to_string());
    }

    pub async fn fail_bulk_writes(&self, fail: bool) {
        *self.fail_bulk.write().await = fail;
    }

    /// Make every write targeting `id` stall for `delay` before applying
    pub async fn delay_writes_for(&self, id: &str, delay: Duration) {
        self.write_delays.write().await.insert(id.to_string(), delay);
    }

    pub async fn delay_bulk_writes(&self, delay: Option<Duration>) {
        *self.bulk_delay.write().await = delay;
    }

    pub async fn clear_failures(&self) {
        self.failing_ids.write().await.clear();
        *self.fail_bulk.write().await = false;
        self.write_delays.write().await.clear();
        *self.bulk_delay.write().await = None;
    }

    async fn check_writable(&self, id: &str) -> Result<(), StoreError> {
        let delay = self.write_delays.read().await.get(id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing_ids.read().await.contains(id) {
            return Err(StoreError::ApiError(format!("write rejected for {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl ParticipantStore for MemoryStore {
    async fn get_all(&self) -> Result<Vec<Participant>, StoreError> {
        Ok(self.participants.read().await.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Participant>, StoreError> {
        Ok(self
            .participants
            .read()
            .await
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn update_fields(&self, id: &str, patch: &ParticipantPatch) -> Result<(), StoreError> {
        self.check_writable(id).await?;

        let mut participants = self.participants.write().await;
        let participant = participants
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Participant {}", id)))?;

        patch.apply_to(participant);
        tracing::debug!("Updated participant {} in memory", id);
        Ok(())
    }

    async fn update_all(&self, patch: &ParticipantPatch) -> Result<(), StoreError> {
        let delay = *self.bulk_delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if *self.fail_bulk.read().await {
            return Err(StoreError::ApiError("bulk update rejected".into()));
        }

        let mut participants = self.participants.write().await;
        for participant in participants.iter_mut() {
            patch.apply_to(participant);
        }
        Ok(())
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError> {
        let mut participants = self.participants.write().await;
        let before = participants.len();
        participants.retain(|p| p.id != id);

        if participants.len() == before {
            return Err(StoreError::NotFound(format!("Participant {}", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, Role};

    fn store() -> MemoryStore {
        MemoryStore::new(vec![
            Participant::new("a", Gender::Male, Role::User),
            Participant::new("b", Gender::Female, Role::User),
        ])
    }

    #[tokio::test]
    async fn test_update_fields_is_scoped() {
        let store = store();
        store
            .update_fields("a", &ParticipantPatch::votes(vec!["b".into()]))
            .await
            .unwrap();

        let a = store.get_by_id("a").await.unwrap().unwrap();
        assert_eq!(a.votes_given, vec!["b"]);
        assert!(a.matches.is_empty());
    }

    #[tokio::test]
    async fn test_default_pair_write_reports_partial() {
        let store = store();
        store.fail_writes_for("b").await;

        let patch = ParticipantPatch::matches(vec!["x".into()]);
        let err = store
            .update_pair(("a", &patch), ("b", &patch), Duration::from_secs(1))
            .await
            .unwrap_err();

        match err {
            StoreError::PartialWrite { applied, missing, .. } => {
                assert_eq!(applied, "a");
                assert_eq!(missing, "b");
            }
            other => panic!("unexpected error: {other}"),
        }
        let a = store.get_by_id("a").await.unwrap().unwrap();
        assert_eq!(a.matches, vec!["x"]);
    }

    #[tokio::test]
    async fn test_default_pair_write_bounds_each_write() {
        let store = store();
        store.delay_writes_for("b", Duration::from_secs(2)).await;

        let patch = ParticipantPatch::matches(vec!["x".into()]);
        let err = store
            .update_pair(("a", &patch), ("b", &patch), Duration::from_millis(100))
            .await
            .unwrap_err();

        match err {
            StoreError::PartialWrite { applied, missing, source } => {
                assert_eq!(applied, "a");
                assert_eq!(missing, "b");
                assert!(matches!(*source, StoreError::Timeout { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_seed_from_json_uses_storage_rows() {
        let store = MemoryStore::default();
        let seeded = store
            .seed_from_json(
                r#"[
                    {"id": "u1", "gender": "Pria", "role": "USER", "votes_given": null, "matches": null},
                    {"id": "u2", "gender": "Wanita", "role": "USER", "votes_given": ["u1"], "matches": []}
                ]"#,
            )
            .await
            .unwrap();

        assert_eq!(seeded, 2);
        let all = store.get_all().await.unwrap();
        assert_eq!(all[0].id, "u1");
        assert!(all[0].votes_given.is_empty());
        assert_eq!(all[1].votes_given, vec!["u1"]);
    }

    #[tokio::test]
    async fn test_insert_replaces_same_id() {
        let store = store();
        let mut a = Participant::new("a", Gender::Male, Role::User);
        a.votes_given = vec!["b".into()];
        store.insert(a).await;
        store.insert(Participant::new("c", Gender::Female, Role::User)).await;

        let all = store.get_all().await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].votes_given, vec!["b"]);
        assert_eq!(all[2].id, "c");
    }

    #[tokio::test]
    async fn test_seed_rejects_malformed_json() {
        let store = MemoryStore::default();
        assert!(matches!(
            store.seed_from_json("{not json").await,
            Err(StoreError::InvalidRecord(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let store = store();
        store.delete_by_id("a").await.unwrap();
        assert!(matches!(
            store.delete_by_id("a").await,
            Err(StoreError::NotFound(_))
        ));
        assert_eq!(store.get_all().await.unwrap().len(), 1);
    }
}
