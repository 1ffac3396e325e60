use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Email;

/// Represents a registered user in the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: Email,
    /// Absent until the user completes the post-signup phone step.
    #[serde(default)]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn needs_phone(&self) -> bool {
        self.phone.is_none()
    }

    /// Case-insensitive substring match over name, email, phone and id.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term)
            || self.email.as_str().contains(&term)
            || self
                .phone
                .as_deref()
                .is_some_and(|phone| phone.to_lowercase().contains(&term))
            || self.id.to_lowercase().contains(&term)
    }
}

/// Payload for creating a new user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub email: Email,
}

impl UserCreate {
    pub fn new(name: impl Into<String>, email: impl Into<Email>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Payload for updating an existing user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}
