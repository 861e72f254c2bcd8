use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Participant gender, stored with the event's own labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "Pria")]
    Male,
    #[serde(rename = "Wanita")]
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Pria",
            Gender::Female => "Wanita",
        }
    }

    pub fn opposite(&self) -> Gender {
        match self {
            Gender::Male => Gender::Female,
            Gender::Female => Gender::Male,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pria" => Ok(Gender::Male),
            "Wanita" => Ok(Gender::Female),
            other => Err(format!("unknown gender: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Profile fields the engine carries but never interprets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(rename = "photoUrl", default)]
    pub photo_url: Option<String>,
    #[serde(rename = "igHandle", default)]
    pub ig_handle: Option<String>,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
}

/// Login material owned by the auth collaborator. Never leaves the service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Credentials {
    pub qr_token: Option<String>,
    pub password: Option<String>,
}

/// A registered event participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub gender: Gender,
    pub role: Role,
    #[serde(flatten)]
    pub profile: Profile,
    #[serde(skip)]
    pub credentials: Credentials,
    #[serde(rename = "votesGiven", default)]
    pub votes_given: Vec<String>,
    #[serde(default)]
    pub matches: Vec<String>,
}

impl Participant {
    /// Bare participant with no votes, matches or profile data
    pub fn new(id: impl Into<String>, gender: Gender, role: Role) -> Self {
        Self {
            id: id.into(),
            gender,
            role,
            profile: Profile::default(),
            credentials: Credentials::default(),
            votes_given: Vec::new(),
            matches: Vec::new(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn has_voted_for(&self, id: &str) -> bool {
        self.votes_given.iter().any(|v| v == id)
    }

    pub fn is_matched_with(&self, id: &str) -> bool {
        self.matches.iter().any(|m| m == id)
    }

    /// First name for notifications, falling back to the id
    pub fn display_name(&self) -> &str {
        self.profile
            .name
            .as_deref()
            .and_then(|n| n.split_whitespace().next())
            .unwrap_or(&self.id)
    }
}

/// Authenticated caller, passed explicitly to every engine entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub participant_id: String,
    pub role: Role,
    pub issued_at: chrono::DateTime<chrono::Utc>,
}

impl SessionContext {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
