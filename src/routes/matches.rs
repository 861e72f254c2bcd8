use actix_web::{web, HttpRequest, HttpResponse, Responder};
use actix_web::http::StatusCode;
use tracing::Instrument;
use validator::Validate;
use crate::core::{candidates_for, matches_for, rank, MatchOutcome};
use crate::models::{
    CastVoteRequest, CastVoteResponse, HealthResponse, MatchStatus, ParticipantListResponse,
    RankingEntryResponse, RankingQuery, RankingResponse, SessionContext,
};
use crate::services::SessionError;
use crate::routes::{bearer, engine_error, error_response, session_error, AppState};

/// Configure participant-facing routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/votes", web::post().to(cast_vote))
        .route("/candidates", web::get().to(get_candidates))
        .route("/me/matches", web::get().to(get_my_matches))
        .route("/rankings", web::get().to(get_rankings));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.engine.health_check().await;

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Cast vote endpoint
///
/// POST /api/v1/votes
///
/// Request body:
/// ```json
/// {
///   "candidateId": "string"
/// }
/// ```
async fn cast_vote(
    state: web::Data<AppState>,
    req: web::Json<CastVoteRequest>,
    http_req: HttpRequest,
) -> impl Responder {
    let authenticated = state.sessions.authenticate(bearer(&http_req)).await;
    let session = match admit_vote(authenticated, &req) {
        Ok(session) => session,
        Err(response) => return response,
    };

    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!(
        "vote",
        %request_id,
        voter = %session.participant_id,
        candidate = %req.candidate_id
    );

    let receipt = match state
        .engine
        .vote(&session, &req.candidate_id)
        .instrument(span)
        .await
    {
        Ok(receipt) => receipt,
        Err(e) => return engine_error(e),
    };

    let matched_with = receipt.matched.candidate_id().map(str::to_string);
    let match_status = match receipt.matched {
        MatchOutcome::Created { .. } => MatchStatus::Created,
        MatchOutcome::AlreadyMatched { .. } => MatchStatus::AlreadyMatched,
        MatchOutcome::NoMatch => MatchStatus::None,
    };

    HttpResponse::Ok().json(CastVoteResponse {
        request_id,
        votes_given: receipt.votes_given,
        votes_left: receipt.votes_left,
        already_voted: receipt.already_voted,
        match_status,
        matched_with,
        notification: receipt.notification,
    })
}

/// Session first, then the body: an anonymous caller learns nothing about validation
fn admit_vote(
    session: Result<SessionContext, SessionError>,
    req: &CastVoteRequest,
) -> Result<SessionContext, HttpResponse> {
    let session = session.map_err(session_error)?;

    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for cast_vote request: field_errors={:?}", errors);
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Validation failed",
            errors.to_string(),
        ));
    }

    Ok(session)
}

/// Candidate list for the voting screen
///
/// GET /api/v1/candidates
async fn get_candidates(state: web::Data<AppState>, http_req: HttpRequest) -> impl Responder {
    let session = match state.sessions.authenticate(bearer(&http_req)).await {
        Ok(session) => session,
        Err(e) => return session_error(e),
    };

    let participants = match state.engine.snapshot().await {
        Ok(participants) => participants,
        Err(e) => return engine_error(e),
    };

    let Some(viewer) = participants.iter().find(|p| p.id == session.participant_id) else {
        return error_response(
            StatusCode::NOT_FOUND,
            "participant_not_found",
            format!("participant not found: {}", session.participant_id),
        );
    };

    let candidates: Vec<_> = candidates_for(viewer, &participants)
        .into_iter()
        .cloned()
        .collect();

    HttpResponse::Ok().json(ParticipantListResponse {
        total: candidates.len(),
        participants: candidates,
    })
}

/// Mutual matches of the session's participant
///
/// GET /api/v1/me/matches
async fn get_my_matches(state: web::Data<AppState>, http_req: HttpRequest) -> impl Responder {
    let session = match state.sessions.authenticate(bearer(&http_req)).await {
        Ok(session) => session,
        Err(e) => return session_error(e),
    };

    let participants = match state.engine.snapshot().await {
        Ok(participants) => participants,
        Err(e) => return engine_error(e),
    };

    let matched: Vec<_> = matches_for(&session.participant_id, &participants)
        .into_iter()
        .cloned()
        .collect();

    tracing::debug!("{} has {} matches", session.participant_id, matched.len());

    HttpResponse::Ok().json(ParticipantListResponse {
        total: matched.len(),
        participants: matched,
    })
}

/// Ranking of one gender group, admins only
///
/// GET /api/v1/rankings?gender={Pria|Wanita}
async fn get_rankings(
    state: web::Data<AppState>,
    query: web::Query<RankingQuery>,
    http_req: HttpRequest,
) -> impl Responder {
    if let Err(e) = state.sessions.authenticate_admin(bearer(&http_req)).await {
        return session_error(e);
    }

    let participants = match state.engine.snapshot().await {
        Ok(participants) => participants,
        Err(e) => return engine_error(e),
    };

    let entries = rank(&participants, query.gender)
        .into_iter()
        .enumerate()
        .map(|(i, entry)| RankingEntryResponse {
            rank: i + 1,
            participant: entry.participant.clone(),
            votes_received: entry.votes_received,
        })
        .collect();

    HttpResponse::Ok().json(RankingResponse {
        gender: query.gender,
        entries,
    })
}
