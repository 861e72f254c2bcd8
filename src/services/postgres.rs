use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::time::Duration;
use crate::models::{Participant, ParticipantPatch, ParticipantRecord};
use crate::services::store::{bounded_write, ParticipantStore, StoreError};

const UPDATE_ONE: &str = r#"
    UPDATE participants
    SET votes_given = COALESCE($2, votes_given),
        matches = COALESCE($3, matches)
    WHERE id = $1
"#;

/// PostgreSQL participant store
///
/// Vote and match lists live in `TEXT[]` columns. Unlike the REST backend
/// this one can write both sides of a match inside a single transaction.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL participant store");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    fn participant_from_row(row: &PgRow) -> Result<Participant, StoreError> {
        let gender: String = row.try_get("gender")?;
        let role: String = row.try_get("role")?;

        let record = ParticipantRecord {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            password: row.try_get("password")?,
            qr_token: row.try_get("qr_token")?,
            role: role.parse().map_err(StoreError::InvalidRecord)?,
            name: row.try_get("name")?,
            gender: gender.parse().map_err(StoreError::InvalidRecord)?,
            bio: row.try_get("bio")?,
            photo_url: row.try_get("photo_url")?,
            ig_handle: row.try_get("ig_handle")?,
            job: row.try_get("job")?,
            age: row.try_get("age")?,
            votes_given: row.try_get("votes_given")?,
            matches: row.try_get("matches")?,
        };

        Ok(record.into())
    }

    async fn update_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: &str,
        patch: &ParticipantPatch,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(UPDATE_ONE)
            .bind(id)
            .bind(&patch.votes_given)
            .bind(&patch.matches)
            .execute(&mut **tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Participant {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl ParticipantStore for PostgresStore {
    async fn get_all(&self) -> Result<Vec<Participant>, StoreError> {
        let query = r#"
            SELECT *
            FROM participants
            ORDER BY created_at, id
        "#;

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;
        let participants = rows
            .iter()
            .map(Self::participant_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Fetched {} participants", participants.len());
        Ok(participants)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Participant>, StoreError> {
        let row = sqlx::query("SELECT * FROM participants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::participant_from_row).transpose()
    }

    async fn update_fields(&self, id: &str, patch: &ParticipantPatch) -> Result<(), StoreError> {
        if patch.is_empty() {
            return Ok(());
        }

        let result = sqlx::query(UPDATE_ONE)
            .bind(id)
            .bind(&patch.votes_given)
            .bind(&patch.matches)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Participant {}", id)));
        }

        tracing::debug!("Updated participant {}: {:?}", id, patch);
        Ok(())
    }

    async fn update_all(&self, patch: &ParticipantPatch) -> Result<(), StoreError> {
        let query = r#"
            UPDATE participants
            SET votes_given = COALESCE($1, votes_given),
                matches = COALESCE($2, matches)
        "#;

        let result = sqlx::query(query)
            .bind(&patch.votes_given)
            .bind(&patch.matches)
            .execute(&self.pool)
            .await?;

        tracing::info!("Bulk updated {} participants", result.rows_affected());
        Ok(())
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM participants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Participant {}", id)));
        }
        Ok(())
    }

    async fn update_pair(
        &self,
        first: (&str, &ParticipantPatch),
        second: (&str, &ParticipantPatch),
        deadline: Duration,
    ) -> Result<(), StoreError> {
        // An elapsed deadline drops the transaction, which rolls it back
        let target = format!("{} and {}", first.0, second.0);
        bounded_write(&target, deadline, async {
            let mut tx = self.pool.begin().await?;

            Self::update_in_tx(&mut tx, first.0, first.1).await?;
            Self::update_in_tx(&mut tx, second.0, second.1).await?;

            tx.commit().await?;
            Ok::<(), StoreError>(())
        })
        .await?;

        tracing::debug!("Updated pair {} / {} in one transaction", first.0, second.0);
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
