use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use crate::models::{Role, SessionContext};
use crate::services::cache::{CacheError, CacheKey, CacheManager};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid issue time in token")]
    InvalidIssueTime,

    #[error("Session was revoked by an administrative reset")]
    Revoked,

    #[error("Admin role required")]
    Forbidden,

    #[error("Session cache unavailable: {0}")]
    Cache(#[from] CacheError),
}

/// Claims carried by a session token issued by the auth service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 session token codec
pub struct SessionVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl SessionVerifier {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            ttl_secs,
        }
    }

    /// Issue a token for a participant. Used by the login flow and tooling.
    pub fn issue(&self, participant_id: &str, role: Role) -> Result<String, SessionError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: participant_id.to_string(),
            role,
            iat: now,
            exp: now + self.ttl_secs,
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Result<SessionContext, SessionError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        let issued_at =
            DateTime::<Utc>::from_timestamp(data.claims.iat, 0).ok_or(SessionError::InvalidIssueTime)?;

        Ok(SessionContext {
            participant_id: data.claims.sub,
            role: data.claims.role,
            issued_at,
        })
    }

    /// Verify the value of an `Authorization: Bearer ...` header
    pub fn verify_header(&self, header: Option<&str>) -> Result<SessionContext, SessionError> {
        let token = header
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(SessionError::MissingToken)?;

        self.verify(token)
    }
}

/// Sessions issued at or before the last reset second are no longer valid
pub fn is_revoked(session: &SessionContext, revoked_before: Option<DateTime<Utc>>) -> bool {
    revoked_before.is_some_and(|cutoff| session.issued_at <= cutoff)
}

/// Verifies sessions and tracks the reset cutoff in the shared cache
pub struct SessionRegistry {
    verifier: SessionVerifier,
    cache: Arc<CacheManager>,
}

impl SessionRegistry {
    pub fn new(verifier: SessionVerifier, cache: Arc<CacheManager>) -> Self {
        Self { verifier, cache }
    }

    pub async fn authenticate(&self, header: Option<&str>) -> Result<SessionContext, SessionError> {
        let session = self.verifier.verify_header(header)?;

        let revoked_before = match self
            .cache
            .get::<DateTime<Utc>>(&CacheKey::sessions_revoked_before())
            .await
        {
            Ok(cutoff) => Some(cutoff),
            Err(CacheError::CacheMiss(_)) => None,
            Err(e) => return Err(e.into()),
        };

        if is_revoked(&session, revoked_before) {
            tracing::warn!(
                "Rejected session for {} issued at {} (revoked)",
                session.participant_id,
                session.issued_at
            );
            return Err(SessionError::Revoked);
        }

        Ok(session)
    }

    pub async fn authenticate_admin(&self, header: Option<&str>) -> Result<SessionContext, SessionError> {
        let session = self.authenticate(header).await?;
        if !session.is_admin() {
            return Err(SessionError::Forbidden);
        }
        Ok(session)
    }

    /// Invalidate every session issued up to now
    pub async fn revoke_all(&self) -> Result<DateTime<Utc>, SessionError> {
        let now = Utc::now();
        let cutoff = DateTime::<Utc>::from_timestamp(now.timestamp(), 0).unwrap_or(now);

        self.cache
            .set_persistent(&CacheKey::sessions_revoked_before(), &cutoff)
            .await?;

        tracing::info!("Revoked all sessions issued at or before {}", cutoff);
        Ok(cutoff)
    }
}
