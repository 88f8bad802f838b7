//! User and session repositories on top of a document store.
//!
//! Both live in the configured auth database: users in `users`, login
//! sessions in `sessions`.

mod sessions;
mod users;

pub use sessions::DocumentSessionRepository;
pub use users::DocumentUserRepository;

use kowalski_application::{Document, RepositoryError};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

pub const USERS_COLLECTION: &str = "users";
pub const SESSIONS_COLLECTION: &str = "sessions";

fn to_document<T: Serialize>(value: &T) -> Result<Document, RepositoryError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(RepositoryError::Malformed(format!(
            "expected an object, got {}",
            other
        ))),
        Err(e) => Err(RepositoryError::Malformed(e.to_string())),
    }
}

fn from_document<T: DeserializeOwned>(document: Document) -> Result<T, RepositoryError> {
    serde_json::from_value(Value::Object(document))
        .map_err(|e| RepositoryError::Malformed(e.to_string()))
}

fn by_username(username: &str) -> Document {
    let mut filter = Document::new();
    filter.insert("username".to_string(), Value::String(username.to_string()));
    filter
}
