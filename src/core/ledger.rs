use std::time::Duration;
use crate::core::deadline::store_call;
use crate::core::error::EngineError;
use crate::models::{Participant, ParticipantPatch};
use crate::services::ParticipantStore;

/// Votes per participant when nothing else is configured
pub const DEFAULT_VOTE_QUOTA: usize = 3;

/// Result of a vote that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    /// The candidate was appended; holds the new list
    Recorded(Vec<String>),
    /// The candidate was already in the list; holds the unchanged list
    AlreadyVoted(Vec<String>),
}

impl VoteOutcome {
    pub fn into_votes(self) -> Vec<String> {
        match self {
            VoteOutcome::Recorded(votes) | VoteOutcome::AlreadyVoted(votes) => votes,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, VoteOutcome::Recorded(_))
    }
}

/// Where a participant stands against the quota
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteStage {
    NoVotes,
    PartiallyVoted,
    QuotaReached,
}

/// Owns the quota, self-vote and duplicate rules for outgoing votes
#[derive(Debug, Clone, Copy)]
pub struct VoteLedger {
    quota: usize,
    require_opposite_gender: bool,
}

impl VoteLedger {
    pub fn new(quota: usize) -> Self {
        Self {
            quota,
            require_opposite_gender: false,
        }
    }

    /// Reject votes between participants of the same gender
    pub fn with_opposite_gender_rule(mut self, enabled: bool) -> Self {
        self.require_opposite_gender = enabled;
        self
    }

    pub fn quota(&self) -> usize {
        self.quota
    }

    pub fn votes_left(&self, votes_given: &[String]) -> usize {
        self.quota.saturating_sub(votes_given.len())
    }

    pub fn stage(&self, votes_given: &[String]) -> VoteStage {
        match votes_given.len() {
            0 => VoteStage::NoVotes,
            n if n >= self.quota => VoteStage::QuotaReached,
            _ => VoteStage::PartiallyVoted,
        }
    }

    /// Role and gender rules that need both full snapshots
    pub fn check_eligibility(
        &self,
        voter: &Participant,
        candidate: &Participant,
    ) -> Result<(), EngineError> {
        if !voter.is_user() {
            return Err(EngineError::NotEligible(format!(
                "{} is not a voting participant",
                voter.id
            )));
        }
        if !candidate.is_user() {
            return Err(EngineError::NotEligible(format!(
                "{} cannot receive votes",
                candidate.id
            )));
        }
        if self.require_opposite_gender && voter.gender == candidate.gender {
            return Err(EngineError::NotEligible(format!(
                "{} and {} share the same gender",
                voter.id, candidate.id
            )));
        }
        Ok(())
    }

    /// Decide what a vote does to `current` without touching the store
    ///
    /// Checks run in order: self-vote, duplicate, quota. A repeated click
    /// after the quota is used up is still an idempotent no-op.
    pub fn validate(
        &self,
        voter_id: &str,
        candidate_id: &str,
        current: &[String],
    ) -> Result<VoteOutcome, EngineError> {
        if voter_id == candidate_id {
            return Err(EngineError::SelfVote);
        }

        if current.iter().any(|id| id == candidate_id) {
            return Ok(VoteOutcome::AlreadyVoted(current.to_vec()));
        }

        if current.len() >= self.quota {
            return Err(EngineError::QuotaExceeded { quota: self.quota });
        }

        let mut votes = current.to_vec();
        votes.push(candidate_id.to_string());
        Ok(VoteOutcome::Recorded(votes))
    }

    /// Validate and persist one vote
    ///
    /// `current` must be the voter's list as read right before the call.
    /// A recorded vote issues exactly one update, scoped to `votes_given`.
    pub async fn cast_vote(
        &self,
        store: &dyn ParticipantStore,
        voter_id: &str,
        candidate_id: &str,
        current: &[String],
        timeout: Duration,
    ) -> Result<VoteOutcome, EngineError> {
        let outcome = self.validate(voter_id, candidate_id, current)?;

        if let VoteOutcome::Recorded(votes) = &outcome {
            let patch = ParticipantPatch::votes(votes.clone());
            store_call("update votes", timeout, store.update_fields(voter_id, &patch)).await?;

            tracing::info!(
                "Recorded vote {} -> {} ({}/{})",
                voter_id,
                candidate_id,
                votes.len(),
                self.quota
            );
        } else {
            tracing::debug!("Vote {} -> {} already recorded", voter_id, candidate_id);
        }

        Ok(outcome)
    }
}

impl Default for VoteLedger {
    fn default() -> Self {
        Self::new(DEFAULT_VOTE_QUOTA)
    }
}
