// Route exports
pub mod admin;
pub mod matches;

use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpRequest, HttpResponse};
use std::sync::Arc;
use crate::core::{EngineError, VotingEngine};
use crate::models::ErrorResponse;
use crate::services::{SessionError, SessionRegistry};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<VotingEngine>,
    pub sessions: Arc<SessionRegistry>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure)
            .configure(admin::configure),
    );
}

pub(crate) fn bearer(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

pub(crate) fn error_response(status: StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

/// HTTP status and error code for each engine failure
pub fn engine_status(err: &EngineError) -> (StatusCode, &'static str) {
    match err {
        EngineError::QuotaExceeded { .. } => (StatusCode::CONFLICT, "quota_exceeded"),
        EngineError::SelfVote => (StatusCode::BAD_REQUEST, "self_vote"),
        EngineError::NotEligible(_) => (StatusCode::FORBIDDEN, "not_eligible"),
        EngineError::ParticipantNotFound(_) => (StatusCode::NOT_FOUND, "participant_not_found"),
        EngineError::StoreUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable"),
        EngineError::StoreTimeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "store_timeout"),
        EngineError::AsymmetricMatch { .. } => (StatusCode::BAD_GATEWAY, "asymmetric_match"),
        EngineError::BulkResetFailure(_) => (StatusCode::SERVICE_UNAVAILABLE, "bulk_reset_failure"),
    }
}

pub(crate) fn engine_error(err: EngineError) -> HttpResponse {
    let (status, code) = engine_status(&err);
    if err.is_rejection() {
        tracing::warn!("Request rejected: {}", err);
    } else {
        tracing::error!("Engine failure: {}", err);
    }
    error_response(status, code, err.to_string())
}

pub fn session_status(err: &SessionError) -> (StatusCode, &'static str) {
    match err {
        SessionError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
        SessionError::Cache(_) => (StatusCode::SERVICE_UNAVAILABLE, "session_cache_unavailable"),
        SessionError::Revoked => (StatusCode::UNAUTHORIZED, "session_revoked"),
        SessionError::MissingToken
        | SessionError::InvalidToken(_)
        | SessionError::InvalidIssueTime => (StatusCode::UNAUTHORIZED, "unauthorized"),
    }
}

pub(crate) fn session_error(err: SessionError) -> HttpResponse {
    let (status, code) = session_status(&err);
    tracing::info!("Session rejected: {}", err);
    error_response(status, code, err.to_string())
}
