use crate::models::Participant;

/// Check if a participant belongs on the viewer's voting screen
///
/// Only users of the opposite gender, never the viewer. This is the list the
/// voting screen shows; it is not a rule the ledger enforces unless the
/// opposite-gender rule is switched on.
#[inline]
pub fn is_candidate_for(viewer: &Participant, candidate: &Participant) -> bool {
    candidate.is_user()
        && candidate.id != viewer.id
        && candidate.gender == viewer.gender.opposite()
}

/// Candidates for `viewer`, in participant order
pub fn candidates_for<'a>(viewer: &Participant, participants: &'a [Participant]) -> Vec<&'a Participant> {
    participants
        .iter()
        .filter(|candidate| is_candidate_for(viewer, candidate))
        .collect()
}
