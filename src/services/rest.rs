use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use crate::models::{Participant, ParticipantPatch, ParticipantRecord};
use crate::services::store::{ParticipantStore, StoreError};

/// Participant store backed by a PostgREST (Supabase) endpoint
///
/// Handles all communication with the hosted record store including:
/// - Fetching the participant set
/// - Field-scoped PATCH updates on a single row
/// - The bulk reset PATCH across every row
pub struct RestStore {
    base_url: String,
    api_key: String,
    table: String,
    client: Client,
}

impl RestStore {
    pub fn new(
        base_url: String,
        api_key: String,
        table: String,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            table,
            client,
        })
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.base_url.trim_end_matches('/'),
            self.table
        )
    }

    fn row_filter(id: &str) -> String {
        format!("id=eq.{}", urlencoding::encode(id))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
    }

    async fn ensure_success(response: Response, action: &str) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read body".to_string());
        tracing::error!("Failed to {}: {} - {}", action, status, body);
        Err(StoreError::ApiError(format!("Failed to {}: {}", action, status)))
    }

    async fn fetch_rows(&self, url: &str, action: &str) -> Result<Vec<Participant>, StoreError> {
        let response = self.authorized(self.client.get(url)).send().await?;
        let response = Self::ensure_success(response, action).await?;

        let rows: Vec<ParticipantRecord> = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidRecord(format!("Failed to parse participants: {}", e)))?;

        Ok(rows.into_iter().map(Participant::from).collect())
    }

    async fn patch(&self, url: &str, patch: &ParticipantPatch, action: &str) -> Result<(), StoreError> {
        let response = self
            .authorized(self.client.patch(url))
            .header("Prefer", "return=minimal")
            .json(patch)
            .send()
            .await?;

        Self::ensure_success(response, action).await?;
        Ok(())
    }
}

#[async_trait]
impl ParticipantStore for RestStore {
    async fn get_all(&self) -> Result<Vec<Participant>, StoreError> {
        let url = format!("{}?select=*", self.table_url());
        let participants = self.fetch_rows(&url, "fetch participants").await?;

        tracing::debug!("Fetched {} participants", participants.len());
        Ok(participants)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Participant>, StoreError> {
        let url = format!("{}?{}&select=*", self.table_url(), Self::row_filter(id));

        tracing::debug!("Fetching participant: {}", id);

        let mut rows = self.fetch_rows(&url, "fetch participant").await?;
        Ok(if rows.is_empty() { None } else { Some(rows.swap_remove(0)) })
    }

    async fn update_fields(&self, id: &str, patch: &ParticipantPatch) -> Result<(), StoreError> {
        if patch.is_empty() {
            return Ok(());
        }

        let url = format!("{}?{}", self.table_url(), Self::row_filter(id));
        self.patch(&url, patch, "update participant").await?;

        tracing::debug!("Updated participant {}: {:?}", id, patch);
        Ok(())
    }

    async fn update_all(&self, patch: &ParticipantPatch) -> Result<(), StoreError> {
        // PostgREST refuses unfiltered updates; every row has a non-empty id.
        let url = format!("{}?id=neq.", self.table_url());
        self.patch(&url, patch, "update all participants").await
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError> {
        let url = format!("{}?{}", self.table_url(), Self::row_filter(id));
        let response = self.authorized(self.client.delete(&url)).send().await?;

        Self::ensure_success(response, "delete participant").await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        let url = format!("{}?select=id&limit=1", self.table_url());
        let response = self.authorized(self.client.get(&url)).send().await?;
        Ok(response.status().is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn store(url: &str) -> RestStore {
        RestStore::new(
            url.to_string(),
            "test_key".to_string(),
            "users".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_rest_store_creation() {
        let store = store("https://records.test/");

        assert_eq!(store.table_url(), "https://records.test/rest/v1/users");
        assert_eq!(store.api_key, "test_key");
    }

    #[tokio::test]
    async fn test_get_all_maps_rows() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/users")
            .match_query(Matcher::UrlEncoded("select".into(), "*".into()))
            .match_header("apikey", "test_key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!([
                    { "id": "u1", "role": "USER", "gender": "Pria", "votes_given": ["u2"], "matches": null },
                    { "id": "u2", "role": "USER", "gender": "Wanita" }
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let participants = store(&server.url()).get_all().await.unwrap();

        mock.assert_async().await;
        assert_eq!(participants.len(), 2);
        assert_eq!(participants[0].votes_given, vec!["u2"]);
        assert!(participants[0].matches.is_empty());
        assert!(participants[1].votes_given.is_empty());
    }

    #[tokio::test]
    async fn test_get_by_id_missing_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/users")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("id".into(), "eq.ghost".into()),
                Matcher::UrlEncoded("select".into(), "*".into()),
            ]))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let found = store(&server.url()).get_by_id("ghost").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_update_fields_sends_only_votes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/rest/v1/users")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.u1".into()))
            .match_header("prefer", "return=minimal")
            .match_body(Matcher::Json(json!({ "votes_given": ["u2", "u3"] })))
            .with_status(204)
            .create_async()
            .await;

        store(&server.url())
            .update_fields("u1", &ParticipantPatch::votes(vec!["u2".into(), "u3".into()]))
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_all_targets_every_row() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/rest/v1/users")
            .match_query(Matcher::UrlEncoded("id".into(), "neq.".into()))
            .match_body(Matcher::Json(json!({ "votes_given": [], "matches": [] })))
            .with_status(204)
            .create_async()
            .await;

        store(&server.url())
            .update_all(&ParticipantPatch::reset())
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_is_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PATCH", "/rest/v1/users")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let err = store(&server.url())
            .update_fields("u1", &ParticipantPatch::matches(vec![]))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::ApiError(_)));
    }
}
