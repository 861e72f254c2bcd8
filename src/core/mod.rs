// Core engine exports
pub mod deadline;
pub mod engine;
pub mod error;
pub mod filters;
pub mod ledger;
pub mod matcher;
pub mod overview;
pub mod ranking;
pub mod reconcile;
pub mod reset;

pub use engine::{VoteReceipt, VotingEngine};
pub use error::EngineError;
pub use filters::{candidates_for, is_candidate_for};
pub use ledger::{VoteLedger, VoteOutcome, VoteStage, DEFAULT_VOTE_QUOTA};
pub use matcher::{MatchDetector, MatchOutcome, MatchPlan, MatchUpdate};
pub use overview::{overview, vote_activity, EventOverview, VoterActivity};
pub use ranking::{find_all_matched_pairs, matches_for, mutual_vote_pairs, pair_key, rank, MatchedPair, RankingEntry};
pub use reconcile::{plan_repairs, reconcile, MatchRepair, ReconcileReport};
pub use reset::AdminResetController;
