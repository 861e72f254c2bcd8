use serde::Serialize;
use std::collections::{HashMap, HashSet};
use crate::models::{Gender, Participant};

/// One row of a ranking: a participant and the votes they received
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RankingEntry<'a> {
    pub participant: &'a Participant,
    #[serde(rename = "votesReceived")]
    pub votes_received: usize,
}

/// Canonical key of an unordered pair: the two ids sorted
pub fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Two mutually matched participants, in the order they were found
#[derive(Debug, Clone, Copy)]
pub struct MatchedPair<'a> {
    pub first: &'a Participant,
    pub second: &'a Participant,
}

impl MatchedPair<'_> {
    pub fn key(&self) -> (String, String) {
        pair_key(&self.first.id, &self.second.id)
    }
}

/// Votes received per participant id, counting each voter at most once
pub fn votes_received(participants: &[Participant]) -> HashMap<&str, usize> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for voter in participants {
        let distinct: HashSet<&str> = voter.votes_given.iter().map(String::as_str).collect();
        for id in distinct {
            *counts.entry(id).or_insert(0) += 1;
        }
    }
    counts
}

/// Rank the users of one gender by votes received
///
/// Votes are counted across the whole participant set, not just the group.
/// The sort is stable: equal counts keep their input order.
pub fn rank(participants: &[Participant], group: Gender) -> Vec<RankingEntry<'_>> {
    let counts = votes_received(participants);

    let mut entries: Vec<RankingEntry<'_>> = participants
        .iter()
        .filter(|p| p.is_user() && p.gender == group)
        .map(|participant| RankingEntry {
            participant,
            votes_received: counts.get(participant.id.as_str()).copied().unwrap_or(0),
        })
        .collect();

    entries.sort_by(|a, b| b.votes_received.cmp(&a.votes_received));
    entries
}

fn collect_pairs<'a, F>(participants: &'a [Participant], linked: F) -> Vec<MatchedPair<'a>>
where
    F: Fn(&Participant) -> &[String],
{
    let by_id: HashMap<&str, &Participant> =
        participants.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut pairs = Vec::new();

    for first in participants {
        for other_id in linked(first) {
            if other_id == &first.id {
                continue;
            }
            let Some(&second) = by_id.get(other_id.as_str()) else {
                continue;
            };
            if !linked(second).iter().any(|id| id == &first.id) {
                continue;
            }
            if seen.insert(pair_key(&first.id, &second.id)) {
                pairs.push(MatchedPair { first, second });
            }
        }
    }

    pairs
}

/// Every unordered pair where each side lists the other in `matches`
pub fn find_all_matched_pairs(participants: &[Participant]) -> Vec<MatchedPair<'_>> {
    collect_pairs(participants, |p| p.matches.as_slice())
}

/// Every unordered pair where each side voted for the other
///
/// This ignores `matches` entirely, which makes it the source of truth the
/// reconciliation pass repairs `matches` against.
pub fn mutual_vote_pairs(participants: &[Participant]) -> Vec<MatchedPair<'_>> {
    collect_pairs(participants, |p| p.votes_given.as_slice())
}

/// Participants mutually matched with `id`, in participant order
pub fn matches_for<'a>(id: &str, participants: &'a [Participant]) -> Vec<&'a Participant> {
    let Some(me) = participants.iter().find(|p| p.id == id) else {
        return Vec::new();
    };

    participants
        .iter()
        .filter(|other| other.id != me.id)
        .filter(|other| me.is_matched_with(&other.id) && other.is_matched_with(&me.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn user(id: &str, gender: Gender, votes: &[&str]) -> Participant {
        let mut p = Participant::new(id, gender, Role::User);
        p.votes_given = votes.iter().map(|v| v.to_string()).collect();
        p
    }

    #[test]
    fn test_rank_counts_across_groups() {
        let participants = vec![
            user("m1", Gender::Male, &["f1"]),
            user("m2", Gender::Male, &["f1", "f2"]),
            user("f1", Gender::Female, &["m2"]),
            user("f2", Gender::Female, &[]),
        ];

        let ranking = rank(&participants, Gender::Female);
        let ids: Vec<_> = ranking.iter().map(|e| e.participant.id.as_str()).collect();

        assert_eq!(ids, vec!["f1", "f2"]);
        assert_eq!(ranking[0].votes_received, 2);
        assert_eq!(ranking[1].votes_received, 1);
    }

    #[test]
    fn test_rank_excludes_admins() {
        let admin = Participant::new("admin", Gender::Male, Role::Admin);
        let participants = vec![admin, user("m1", Gender::Male, &[]), user("f1", Gender::Female, &["admin"])];

        let ranking = rank(&participants, Gender::Male);
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].participant.id, "m1");
    }

    #[test]
    fn test_rank_is_stable_for_ties() {
        let participants = vec![
            user("m1", Gender::Male, &[]),
            user("m2", Gender::Male, &[]),
            user("m3", Gender::Male, &[]),
            user("f1", Gender::Female, &["m3"]),
        ];

        let ranking = rank(&participants, Gender::Male);
        let ids: Vec<_> = ranking.iter().map(|e| e.participant.id.as_str()).collect();

        assert_eq!(ids, vec!["m3", "m1", "m2"]);
    }

    #[test]
    fn test_duplicate_votes_count_once() {
        let participants = vec![user("m1", Gender::Male, &["f1", "f1"]), user("f1", Gender::Female, &[])];

        assert_eq!(rank(&participants, Gender::Female)[0].votes_received, 1);
    }

    #[test]
    fn test_matched_pairs_deduplicated() {
        let mut a = user("a", Gender::Male, &["b"]);
        let mut b = user("b", Gender::Female, &["a"]);
        a.matches = vec!["b".into()];
        b.matches = vec!["a".into()];
        let mut c = user("c", Gender::Male, &[]);
        c.matches = vec!["b".into()];

        let participants = vec![a, b, c];
        let pairs = find_all_matched_pairs(&participants);

        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].key(), ("a".to_string(), "b".to_string()));
    }

    #[test]
    fn test_mutual_vote_pairs_ignore_matches() {
        let participants = vec![
            user("a", Gender::Male, &["b", "c"]),
            user("b", Gender::Female, &["a"]),
            user("c", Gender::Female, &["d"]),
        ];

        let pairs = mutual_vote_pairs(&participants);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].key(), ("a".to_string(), "b".to_string()));
    }

    #[test]
    fn test_matches_for_requires_both_sides() {
        let mut a = user("a", Gender::Male, &[]);
        let mut b = user("b", Gender::Female, &[]);
        let c = user("c", Gender::Female, &[]);
        a.matches = vec!["b".into(), "c".into()];
        b.matches = vec!["a".into()];

        let participants = vec![a, b, c];
        let mine: Vec<_> = matches_for("a", &participants).iter().map(|p| p.id.clone()).collect();

        assert_eq!(mine, vec!["b"]);
        assert!(matches_for("ghost", &participants).is_empty());
    }
}
