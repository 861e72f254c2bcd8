use serde::{Deserialize, Serialize};
use crate::models::domain::{Credentials, Gender, Participant, Profile, Role};

/// Row shape at the storage boundary (snake_case, nullable arrays)
///
/// Every column maps onto a [`Participant`] field and back. The only
/// defaults applied are `votes_given` and `matches`, which become empty
/// sequences when absent or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub qr_token: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub name: Option<String>,
    pub gender: Gender,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub ig_handle: Option<String>,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub votes_given: Option<Vec<String>>,
    #[serde(default)]
    pub matches: Option<Vec<String>>,
}

impl From<ParticipantRecord> for Participant {
    fn from(row: ParticipantRecord) -> Self {
        Participant {
            id: row.id,
            gender: row.gender,
            role: row.role,
            profile: Profile {
                username: row.username,
                name: row.name,
                bio: row.bio,
                photo_url: row.photo_url,
                ig_handle: row.ig_handle,
                job: row.job,
                age: row.age,
            },
            credentials: Credentials {
                qr_token: row.qr_token,
                password: row.password,
            },
            votes_given: row.votes_given.unwrap_or_default(),
            matches: row.matches.unwrap_or_default(),
        }
    }
}

impl From<Participant> for ParticipantRecord {
    fn from(p: Participant) -> Self {
        ParticipantRecord {
            id: p.id,
            username: p.profile.username,
            password: p.credentials.password,
            qr_token: p.credentials.qr_token,
            role: p.role,
            name: p.profile.name,
            gender: p.gender,
            bio: p.profile.bio,
            photo_url: p.profile.photo_url,
            ig_handle: p.profile.ig_handle,
            job: p.profile.job,
            age: p.profile.age,
            votes_given: Some(p.votes_given),
            matches: Some(p.matches),
        }
    }
}

/// Field-scoped update. Unset fields are left untouched by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParticipantPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub votes_given: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<String>>,
}

impl ParticipantPatch {
    pub fn votes(votes_given: Vec<String>) -> Self {
        Self {
            votes_given: Some(votes_given),
            matches: None,
        }
    }

    pub fn matches(matches: Vec<String>) -> Self {
        Self {
            votes_given: None,
            matches: Some(matches),
        }
    }

    /// Clears both vote and match state
    pub fn reset() -> Self {
        Self {
            votes_given: Some(Vec::new()),
            matches: Some(Vec::new()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.votes_given.is_none() && self.matches.is_none()
    }

    pub fn apply_to(&self, participant: &mut Participant) {
        if let Some(votes) = &self.votes_given {
            participant.votes_given = votes.clone();
        }
        if let Some(matches) = &self.matches {
            participant.matches = matches.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_arrays_default_to_empty() {
        let row: ParticipantRecord = serde_json::from_value(json!({
            "id": "u1",
            "role": "USER",
            "gender": "Pria",
            "votes_given": null,
        }))
        .unwrap();

        let participant = Participant::from(row);
        assert!(participant.votes_given.is_empty());
        assert!(participant.matches.is_empty());
    }

    #[test]
    fn test_mapping_keeps_every_field() {
        let row: ParticipantRecord = serde_json::from_value(json!({
            "id": "u1",
            "username": "USER01",
            "password": "123",
            "qr_token": "AB12CD34",
            "role": "USER",
            "name": "Budi Santoso",
            "gender": "Pria",
            "bio": "hi",
            "photo_url": "/images/USER01.jpg",
            "ig_handle": "budi",
            "job": "Engineer",
            "age": 27,
            "votes_given": ["u2", "u3"],
            "matches": ["u2"],
        }))
        .unwrap();

        let back = ParticipantRecord::from(Participant::from(row.clone()));
        assert_eq!(back, row);
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let patch = ParticipantPatch::votes(vec!["u2".to_string()]);
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({ "votes_given": ["u2"] })
        );

        let reset = ParticipantPatch::reset();
        assert_eq!(
            serde_json::to_value(&reset).unwrap(),
            json!({ "votes_given": [], "matches": [] })
        );
    }

    #[test]
    fn test_patch_apply_leaves_other_fields() {
        let mut participant = Participant::new("u1", Gender::Female, Role::User);
        participant.votes_given = vec!["u2".to_string()];

        ParticipantPatch::matches(vec!["u2".to_string()]).apply_to(&mut participant);

        assert_eq!(participant.votes_given, vec!["u2"]);
        assert_eq!(participant.matches, vec!["u2"]);
    }
}
