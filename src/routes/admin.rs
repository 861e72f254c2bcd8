use actix_web::{web, HttpRequest, HttpResponse, Responder};
use actix_web::http::StatusCode;
use crate::core::{find_all_matched_pairs, overview, vote_activity};
use crate::models::{
    MatchedPairResponse, MatchedPairsResponse, OverviewResponse, ReconcileResponse, ResetResponse,
    VoteActivityResponse, VoteTargetResponse, VoterActivityResponse,
};
use crate::routes::{bearer, engine_error, error_response, session_error, AppState};

/// Configure admin routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/overview", web::get().to(get_overview))
            .route("/votes", web::get().to(get_votes))
            .route("/matches", web::get().to(get_matched_pairs))
            .route("/reset", web::post().to(reset_all))
            .route("/reconcile", web::post().to(reconcile)),
    );
}

/// Dashboard counters: users, matched pairs, votes cast
///
/// GET /api/v1/admin/overview
async fn get_overview(state: web::Data<AppState>, http_req: HttpRequest) -> impl Responder {
    if let Err(e) = state.sessions.authenticate_admin(bearer(&http_req)).await {
        return session_error(e);
    }

    let participants = match state.engine.snapshot().await {
        Ok(participants) => participants,
        Err(e) => return engine_error(e),
    };

    let summary = overview(&participants);
    HttpResponse::Ok().json(OverviewResponse {
        participants: summary.participants,
        successful_matches: summary.successful_matches,
        votes_cast: summary.votes_cast,
    })
}

/// Who each user voted for and how much quota they used
///
/// GET /api/v1/admin/votes
async fn get_votes(state: web::Data<AppState>, http_req: HttpRequest) -> impl Responder {
    if let Err(e) = state.sessions.authenticate_admin(bearer(&http_req)).await {
        return session_error(e);
    }

    let participants = match state.engine.snapshot().await {
        Ok(participants) => participants,
        Err(e) => return engine_error(e),
    };

    let ledger = state.engine.ledger();
    let voters: Vec<VoterActivityResponse> = vote_activity(&participants, ledger)
        .into_iter()
        .map(|activity| VoterActivityResponse {
            voter: activity.voter.clone(),
            votes: activity
                .votes
                .iter()
                .map(|candidate| VoteTargetResponse {
                    id: candidate.id.clone(),
                    name: candidate.display_name().to_string(),
                    photo_url: candidate.profile.photo_url.clone(),
                })
                .collect(),
            votes_used: activity.votes_used,
            votes_left: activity.votes_left,
        })
        .collect();

    HttpResponse::Ok().json(VoteActivityResponse {
        quota: ledger.quota(),
        total: voters.len(),
        voters,
    })
}

/// Every mutually matched pair, once
///
/// GET /api/v1/admin/matches
async fn get_matched_pairs(state: web::Data<AppState>, http_req: HttpRequest) -> impl Responder {
    if let Err(e) = state.sessions.authenticate_admin(bearer(&http_req)).await {
        return session_error(e);
    }

    let participants = match state.engine.snapshot().await {
        Ok(participants) => participants,
        Err(e) => return engine_error(e),
    };

    let pairs: Vec<MatchedPairResponse> = find_all_matched_pairs(&participants)
        .into_iter()
        .map(|pair| {
            let (a, b) = pair.key();
            MatchedPairResponse {
                key: format!("{}-{}", a, b),
                first: pair.first.clone(),
                second: pair.second.clone(),
            }
        })
        .collect();

    HttpResponse::Ok().json(MatchedPairsResponse {
        total: pairs.len(),
        pairs,
    })
}

/// Clear every vote and match, then log everyone out
///
/// POST /api/v1/admin/reset
async fn reset_all(state: web::Data<AppState>, http_req: HttpRequest) -> impl Responder {
    let admin = match state.sessions.authenticate_admin(bearer(&http_req)).await {
        Ok(session) => session,
        Err(e) => return session_error(e),
    };

    tracing::warn!("Full reset requested by {}", admin.participant_id);

    if let Err(e) = state.engine.reset_all().await {
        return engine_error(e);
    }

    match state.sessions.revoke_all().await {
        Ok(cutoff) => HttpResponse::Ok().json(ResetResponse {
            success: true,
            sessions_revoked_at: cutoff,
        }),
        Err(e) => {
            tracing::error!("Votes were reset but sessions could not be revoked: {}", e);
            error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "session_revocation_failed",
                format!("votes and matches were cleared but sessions are still valid: {}", e),
            )
        }
    }
}

/// Rebuild missing matches from mutual votes
///
/// POST /api/v1/admin/reconcile
async fn reconcile(state: web::Data<AppState>, http_req: HttpRequest) -> impl Responder {
    if let Err(e) = state.sessions.authenticate_admin(bearer(&http_req)).await {
        return session_error(e);
    }

    match state.engine.reconcile().await {
        Ok(report) => HttpResponse::Ok().json(ReconcileResponse {
            mutual_pairs: report.mutual_pairs,
            repaired: report.repaired,
            failed: report.failed,
        }),
        Err(e) => engine_error(e),
    }
}
