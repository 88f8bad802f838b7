//! Account entities

use serde::{Deserialize, Serialize};

/// A registered user (Entity)
///
/// `username` is unique. The password is only ever held as a hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier, normalized to a string
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub username: String,
    #[serde(rename = "password")]
    pub password_hash: String,
}

impl User {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The public projection of this user, safe to return to clients.
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id.clone().unwrap_or_default(),
            username: self.username.clone(),
        }
    }
}

/// Client-facing user representation without credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
}
