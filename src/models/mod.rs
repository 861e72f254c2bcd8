// Model exports
pub mod domain;
pub mod record;
pub mod requests;
pub mod responses;

pub use domain::{Credentials, Gender, Participant, Profile, Role, SessionContext};
pub use record::{ParticipantPatch, ParticipantRecord};
pub use requests::{CastVoteRequest, RankingQuery};
pub use responses::{
    CastVoteResponse, ErrorResponse, HealthResponse, MatchStatus, MatchedPairResponse,
    MatchedPairsResponse, OverviewResponse, ParticipantListResponse, RankingEntryResponse,
    RankingResponse, ReconcileResponse, ResetResponse, VoteActivityResponse, VoteTargetResponse,
    VoterActivityResponse,
};
