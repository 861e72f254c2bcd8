use std::sync::Arc;
use std::time::Duration;
use crate::core::deadline::store_call;
use crate::core::error::EngineError;
use crate::core::ledger::VoteLedger;
use crate::core::matcher::{MatchDetector, MatchOutcome};
use crate::core::reconcile::{reconcile, ReconcileReport};
use crate::core::reset::AdminResetController;
use crate::models::{Participant, SessionContext};
use crate::services::ParticipantStore;

/// What a vote did, for the caller to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteReceipt {
    pub votes_given: Vec<String>,
    pub votes_left: usize,
    pub already_voted: bool,
    pub matched: MatchOutcome,
    /// Shown to the voter once, only for a newly created match
    pub notification: Option<String>,
}

/// Stateless entry point tying ledger, detector and reset to one store
///
/// Every call reads what it needs from the store; nothing about a session
/// is kept between calls.
pub struct VotingEngine {
    store: Arc<dyn ParticipantStore>,
    ledger: VoteLedger,
    detector: MatchDetector,
    reset: AdminResetController,
    timeout: Duration,
    reconcile_on_fetch: bool,
}

impl VotingEngine {
    pub fn new(store: Arc<dyn ParticipantStore>, ledger: VoteLedger, timeout: Duration) -> Self {
        Self {
            store,
            ledger,
            detector: MatchDetector::new(),
            reset: AdminResetController::new(),
            timeout,
            reconcile_on_fetch: false,
        }
    }

    /// Repair `matches` from votes on every full fetch
    pub fn with_reconcile_on_fetch(mut self, enabled: bool) -> Self {
        self.reconcile_on_fetch = enabled;
        self
    }

    /// Vote rules in force, for views that report quota usage
    pub fn ledger(&self) -> &VoteLedger {
        &self.ledger
    }

    async fn require(&self, id: &str) -> Result<Participant, EngineError> {
        store_call("get participant", self.timeout, self.store.get_by_id(id))
            .await?
            .ok_or_else(|| EngineError::ParticipantNotFound(id.to_string()))
    }

    /// Cast a vote for the session's participant
    ///
    /// Order is fixed: validate, write the vote, re-read the candidate, then
    /// check for a match. A repeated vote still runs the match check so a
    /// previously missed match gets recorded.
    pub async fn vote(
        &self,
        session: &SessionContext,
        candidate_id: &str,
    ) -> Result<VoteReceipt, EngineError> {
        let voter_id = session.participant_id.as_str();
        if voter_id == candidate_id {
            tracing::warn!("Rejected self vote by {}", voter_id);
            return Err(EngineError::SelfVote);
        }

        let mut voter = self.require(voter_id).await?;
        let candidate = self.require(candidate_id).await?;
        self.ledger.check_eligibility(&voter, &candidate)?;

        let outcome = self
            .ledger
            .cast_vote(
                self.store.as_ref(),
                &voter.id,
                &candidate.id,
                &voter.votes_given,
                self.timeout,
            )
            .await?;
        let already_voted = !outcome.is_new();
        voter.votes_given = outcome.into_votes();

        // Fresh read: the candidate may have voted since the first read
        let candidate = self.require(candidate_id).await?;
        let matched = self
            .detector
            .check_and_record_match(self.store.as_ref(), &voter, &candidate, self.timeout)
            .await?;

        let notification = match &matched {
            MatchOutcome::Created { .. } => Some(format!(
                "MATCH! You & {} picked each other!",
                candidate.display_name()
            )),
            _ => None,
        };

        Ok(VoteReceipt {
            votes_left: self.ledger.votes_left(&voter.votes_given),
            votes_given: voter.votes_given,
            already_voted,
            matched,
            notification,
        })
    }

    /// Full participant set, reconciled first when configured
    pub async fn snapshot(&self) -> Result<Vec<Participant>, EngineError> {
        let mut participants =
            store_call("get participants", self.timeout, self.store.get_all()).await?;

        if self.reconcile_on_fetch {
            reconcile(self.store.as_ref(), &mut participants, self.timeout).await;
        }

        Ok(participants)
    }

    /// Recompute matches from votes and write any that are missing
    pub async fn reconcile(&self) -> Result<ReconcileReport, EngineError> {
        let mut participants =
            store_call("get participants", self.timeout, self.store.get_all()).await?;
        Ok(reconcile(self.store.as_ref(), &mut participants, self.timeout).await)
    }

    /// Clear all votes and matches. Session invalidation is the caller's job.
    pub async fn reset_all(&self) -> Result<(), EngineError> {
        self.reset.reset_all(self.store.as_ref(), self.timeout).await
    }

    pub async fn health_check(&self) -> bool {
        matches!(
            store_call("health check", self.timeout, self.store.health_check()).await,
            Ok(true)
        )
    }
}
