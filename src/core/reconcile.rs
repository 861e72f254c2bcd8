use std::collections::BTreeMap;
use std::time::Duration;
use crate::core::deadline::store_call;
use crate::core::matcher::union_with;
use crate::core::ranking::mutual_vote_pairs;
use crate::models::{Participant, ParticipantPatch};
use crate::services::ParticipantStore;

/// A `matches` list that has to be rewritten
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRepair {
    pub participant_id: String,
    pub matches: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub mutual_pairs: usize,
    pub repaired: Vec<String>,
    pub failed: Vec<String>,
}

/// Work out which `matches` lists miss a mutual vote
///
/// `votes_given` is the source of truth here. Repairs only add ids, a match
/// already in `matches` is never removed.
pub fn plan_repairs(participants: &[Participant]) -> (usize, Vec<MatchRepair>) {
    let pairs = mutual_vote_pairs(participants);

    // participant id -> (snapshot, target list), ordered for deterministic output
    let mut targets: BTreeMap<&str, (&Participant, Vec<String>)> = BTreeMap::new();

    for pair in &pairs {
        for (me, other) in [(pair.first, pair.second), (pair.second, pair.first)] {
            let (_, target) = targets
                .entry(me.id.as_str())
                .or_insert_with(|| (me, me.matches.clone()));
            *target = union_with(target, &other.id);
        }
    }

    let repairs = targets
        .into_iter()
        .filter(|(_, (me, target))| *target != me.matches)
        .map(|(id, (_, matches))| MatchRepair {
            participant_id: id.to_string(),
            matches,
        })
        .collect();

    (pairs.len(), repairs)
}

/// Recompute matches from votes and write the missing ones
///
/// Closes both the missed-match race and asymmetric pair writes. Each repair
/// is its own field-scoped update; failures are collected, not fatal.
/// Successful repairs are applied to `participants` as well, so the caller's
/// snapshot matches the store afterwards.
pub async fn reconcile(
    store: &dyn ParticipantStore,
    participants: &mut [Participant],
    timeout: Duration,
) -> ReconcileReport {
    let (mutual_pairs, repairs) = plan_repairs(participants);
    let mut report = ReconcileReport {
        mutual_pairs,
        ..Default::default()
    };

    for repair in repairs {
        let patch = ParticipantPatch::matches(repair.matches);
        match store_call("repair matches", timeout, store.update_fields(&repair.participant_id, &patch)).await {
            Ok(()) => {
                if let Some(p) = participants.iter_mut().find(|p| p.id == repair.participant_id) {
                    patch.apply_to(p);
                }
                report.repaired.push(repair.participant_id);
            }
            Err(e) => {
                tracing::error!("Failed to repair matches for {}: {}", repair.participant_id, e);
                report.failed.push(repair.participant_id);
            }
        }
    }

    if !report.repaired.is_empty() || !report.failed.is_empty() {
        tracing::info!(
            "Reconciled {} mutual pairs: {} repaired, {} failed",
            report.mutual_pairs,
            report.repaired.len(),
            report.failed.len()
        );
    }

    report
}
