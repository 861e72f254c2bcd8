use serde::{Deserialize, Serialize};
use crate::models::domain::{Gender, Participant};

/// Response for the cast vote endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastVoteResponse {
    #[serde(rename = "requestId")]
    pub request_id: uuid::Uuid,
    #[serde(rename = "votesGiven")]
    pub votes_given: Vec<String>,
    #[serde(rename = "votesLeft")]
    pub votes_left: usize,
    #[serde(rename = "alreadyVoted")]
    pub already_voted: bool,
    #[serde(rename = "match")]
    pub match_status: MatchStatus,
    #[serde(rename = "matchedWith")]
    pub matched_with: Option<String>,
    /// Set only when a new match was created by this vote
    pub notification: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Created,
    AlreadyMatched,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingEntryResponse {
    pub rank: usize,
    pub participant: Participant,
    #[serde(rename = "votesReceived")]
    pub votes_received: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingResponse {
    pub gender: Gender,
    pub entries: Vec<RankingEntryResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedPairResponse {
    pub key: String,
    pub first: Participant,
    pub second: Participant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedPairsResponse {
    pub pairs: Vec<MatchedPairResponse>,
    pub total: usize,
}

/// Dashboard counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverviewResponse {
    pub participants: usize,
    #[serde(rename = "successfulMatches")]
    pub successful_matches: usize,
    #[serde(rename = "votesCast")]
    pub votes_cast: usize,
}

/// A voted candidate as shown next to the voter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteTargetResponse {
    pub id: String,
    pub name: String,
    #[serde(rename = "photoUrl")]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoterActivityResponse {
    pub voter: Participant,
    pub votes: Vec<VoteTargetResponse>,
    #[serde(rename = "votesUsed")]
    pub votes_used: usize,
    #[serde(rename = "votesLeft")]
    pub votes_left: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteActivityResponse {
    pub quota: usize,
    pub voters: Vec<VoterActivityResponse>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantListResponse {
    pub participants: Vec<Participant>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetResponse {
    pub success: bool,
    #[serde(rename = "sessionsRevokedAt")]
    pub sessions_revoked_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileResponse {
    #[serde(rename = "mutualPairs")]
    pub mutual_pairs: usize,
    pub repaired: Vec<String>,
    pub failed: Vec<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
