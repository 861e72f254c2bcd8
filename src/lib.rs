//! Spark Vote - voting and matching engine for speed-dating events
//!
//! Participants cast a limited number of votes for members of the opposite
//! gender group. Two participants who vote for each other become a mutual
//! match. The library exposes the engine, the store backends it runs on and
//! the derived views (rankings, matched pairs) used by the admin dashboard.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    find_all_matched_pairs, rank, EngineError, MatchOutcome, VoteLedger, VoteReceipt, VotingEngine,
};
pub use crate::models::{Gender, Participant, ParticipantPatch, Role, SessionContext};
pub use crate::services::{MemoryStore, ParticipantStore};
