use std::collections::HashMap;
use crate::core::ledger::VoteLedger;
use crate::core::ranking::find_all_matched_pairs;
use crate::models::Participant;

/// Headline numbers of the admin dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventOverview {
    /// Voting participants; admins are not counted
    pub participants: usize,
    pub successful_matches: usize,
    /// Every vote given across the event
    pub votes_cast: usize,
}

/// Derive the dashboard counters from one snapshot
pub fn overview(participants: &[Participant]) -> EventOverview {
    EventOverview {
        participants: participants.iter().filter(|p| p.is_user()).count(),
        successful_matches: find_all_matched_pairs(participants).len(),
        votes_cast: participants.iter().map(|p| p.votes_given.len()).sum(),
    }
}

/// One voter's votes with the candidates resolved
#[derive(Debug, Clone)]
pub struct VoterActivity<'a> {
    pub voter: &'a Participant,
    /// Voted candidates in vote order; ids no longer in the store are skipped
    pub votes: Vec<&'a Participant>,
    pub votes_used: usize,
    pub votes_left: usize,
}

/// Who every user voted for, in store order
///
/// Quota usage counts the stored vote ids, resolved or not, so it agrees
/// with what the ledger enforces.
pub fn vote_activity<'a>(participants: &'a [Participant], ledger: &VoteLedger) -> Vec<VoterActivity<'a>> {
    let by_id: HashMap<&str, &Participant> =
        participants.iter().map(|p| (p.id.as_str(), p)).collect();

    participants
        .iter()
        .filter(|p| p.is_user())
        .map(|voter| VoterActivity {
            voter,
            votes: voter
                .votes_given
                .iter()
                .filter_map(|id| by_id.get(id.as_str()).copied())
                .collect(),
            votes_used: voter.votes_given.len(),
            votes_left: ledger.votes_left(&voter.votes_given),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, Role};

    fn participant(id: &str, gender: Gender, role: Role, votes: &[&str], matches: &[&str]) -> Participant {
        let mut p = Participant::new(id, gender, role);
        p.votes_given = votes.iter().map(|v| v.to_string()).collect();
        p.matches = matches.iter().map(|m| m.to_string()).collect();
        p
    }

    fn event() -> Vec<Participant> {
        vec![
            participant("admin", Gender::Male, Role::Admin, &[], &[]),
            participant("a", Gender::Male, Role::User, &["b", "c"], &["b"]),
            participant("b", Gender::Female, Role::User, &["a"], &["a"]),
            participant("c", Gender::Female, Role::User, &["gone", "a", "d"], &[]),
            participant("d", Gender::Male, Role::User, &[], &[]),
        ]
    }

    #[test]
    fn test_overview_counts() {
        let summary = overview(&event());

        assert_eq!(summary.participants, 4);
        assert_eq!(summary.successful_matches, 1);
        assert_eq!(summary.votes_cast, 6);
    }

    #[test]
    fn test_overview_ignores_one_sided_match() {
        let mut participants = event();
        participants[3].matches = vec!["a".to_string()];

        assert_eq!(overview(&participants).successful_matches, 1);
    }

    #[test]
    fn test_vote_activity_resolves_candidates() {
        let participants = event();
        let activity = vote_activity(&participants, &VoteLedger::new(3));

        let voters: Vec<&str> = activity.iter().map(|a| a.voter.id.as_str()).collect();
        assert_eq!(voters, vec!["a", "b", "c", "d"]);

        let a = &activity[0];
        let voted: Vec<&str> = a.votes.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(voted, vec!["b", "c"]);
        assert_eq!(a.votes_used, 2);
        assert_eq!(a.votes_left, 1);
    }

    #[test]
    fn test_vote_activity_skips_unknown_ids_but_counts_them() {
        let participants = event();
        let activity = vote_activity(&participants, &VoteLedger::new(3));

        let c = &activity[2];
        let voted: Vec<&str> = c.votes.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(voted, vec!["a", "d"]);
        assert_eq!(c.votes_used, 3);
        assert_eq!(c.votes_left, 0);
        assert_eq!(activity[3].votes_left, 3);
    }
}
