use std::time::Duration;
use crate::core::error::EngineError;
use crate::models::{Participant, ParticipantPatch};
use crate::services::{ParticipantStore, StoreError};

/// Result of checking a fresh vote for a mutual match
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// A new match was written; notify the voter exactly once
    Created { candidate_id: String },
    /// Both sides already record the match; nothing was written
    AlreadyMatched { candidate_id: String },
    NoMatch,
}

impl MatchOutcome {
    pub fn candidate_id(&self) -> Option<&str> {
        match self {
            MatchOutcome::Created { candidate_id } | MatchOutcome::AlreadyMatched { candidate_id } => {
                Some(candidate_id)
            }
            MatchOutcome::NoMatch => None,
        }
    }
}

/// The two `matches` writes a new match needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchUpdate {
    pub voter_id: String,
    pub voter_matches: Vec<String>,
    pub candidate_id: String,
    pub candidate_matches: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchPlan {
    NoMatch,
    AlreadyMatched,
    Write(MatchUpdate),
}

/// Set union on an ordered id list: appends `id` only when missing
pub fn union_with(existing: &[String], id: &str) -> Vec<String> {
    let mut merged = existing.to_vec();
    if !merged.iter().any(|m| m == id) {
        merged.push(id.to_string());
    }
    merged
}

/// Detects mutual votes and records them on both participants
///
/// # Pipeline Stages
/// 1. Mutual vote check on two snapshots read at the same instant
/// 2. Set-union of each side's `matches`
/// 3. Pair write through the store, scoped to `matches`
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchDetector;

impl MatchDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn is_mutual(voter: &Participant, candidate: &Participant) -> bool {
        voter.id != candidate.id
            && voter.has_voted_for(&candidate.id)
            && candidate.has_voted_for(&voter.id)
    }

    /// Decide which writes a mutual vote requires, if any
    pub fn plan(&self, voter: &Participant, candidate: &Participant) -> MatchPlan {
        if !Self::is_mutual(voter, candidate) {
            return MatchPlan::NoMatch;
        }

        if voter.is_matched_with(&candidate.id) && candidate.is_matched_with(&voter.id) {
            return MatchPlan::AlreadyMatched;
        }

        MatchPlan::Write(MatchUpdate {
            voter_id: voter.id.clone(),
            voter_matches: union_with(&voter.matches, &candidate.id),
            candidate_id: candidate.id.clone(),
            candidate_matches: union_with(&candidate.matches, &voter.id),
        })
    }

    /// Check a freshly persisted vote and record the match if it is mutual
    ///
    /// `voter` must already contain the new vote. Re-running on a matched
    /// pair writes nothing. `timeout` bounds each write of the pair on its
    /// own, so a stalled second write still reports which side landed. If
    /// only one side could be written the error is
    /// [`EngineError::AsymmetricMatch`]; the reconciliation pass repairs it.
    pub async fn check_and_record_match(
        &self,
        store: &dyn ParticipantStore,
        voter: &Participant,
        candidate: &Participant,
        timeout: Duration,
    ) -> Result<MatchOutcome, EngineError> {
        let update = match self.plan(voter, candidate) {
            MatchPlan::NoMatch => return Ok(MatchOutcome::NoMatch),
            MatchPlan::AlreadyMatched => {
                tracing::debug!("{} and {} already matched", voter.id, candidate.id);
                return Ok(MatchOutcome::AlreadyMatched {
                    candidate_id: candidate.id.clone(),
                });
            }
            MatchPlan::Write(update) => update,
        };

        let voter_patch = ParticipantPatch::matches(update.voter_matches);
        let candidate_patch = ParticipantPatch::matches(update.candidate_matches);

        let written = store
            .update_pair(
                (&update.voter_id, &voter_patch),
                (&update.candidate_id, &candidate_patch),
                timeout,
            )
            .await;

        match written {
            Ok(()) => {
                tracing::info!("Match recorded: {} <-> {}", update.voter_id, update.candidate_id);
                Ok(MatchOutcome::Created {
                    candidate_id: update.candidate_id,
                })
            }
            Err(StoreError::PartialWrite {
                applied,
                missing,
                source,
            }) => {
                tracing::error!(
                    "Asymmetric match: recorded for {} but not for {}: {}",
                    applied,
                    missing,
                    source
                );
                Err(EngineError::AsymmetricMatch {
                    recorded: applied,
                    missing,
                    source: *source,
                })
            }
            Err(StoreError::Timeout { target, after }) => {
                tracing::error!("Recording match timed out on {} after {:?}", target, after);
                Err(EngineError::StoreTimeout {
                    operation: "record match",
                })
            }
            Err(e) => {
                tracing::error!(
                    "Failed to record match {} <-> {}: {}",
                    update.voter_id,
                    update.candidate_id,
                    e
                );
                Err(EngineError::StoreUnavailable(e))
            }
        }
    }
}
