use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::Gender;

/// Request to cast a vote for a candidate
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CastVoteRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "candidate_id", rename = "candidateId")]
    pub candidate_id: String,
}

/// Query for the ranking endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingQuery {
    pub gender: Gender,
}
