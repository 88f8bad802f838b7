//! Repository ports for accounts and login sessions

use async_trait::async_trait;
use kowalski_domain::{Session, User};
use thiserror::Error;

use super::document_store::StoreError;

/// Errors from a user or session repository
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("'{0}' already exists")]
    AlreadyExists(String),

    #[error("Malformed record: {0}")]
    Malformed(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Storage of registered users
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    /// Insert a new user, returning it with its assigned id.
    ///
    /// Must fail with [`RepositoryError::AlreadyExists`] when the username is
    /// taken, even under concurrent registration.
    async fn insert(&self, user: User) -> Result<User, RepositoryError>;
}

/// Durable storage behind the in-memory session store
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn load_all(&self) -> Result<Vec<Session>, RepositoryError>;

    async fn insert(&self, session: &Session) -> Result<(), RepositoryError>;

    /// Delete every session of `username`, returning how many were removed.
    async fn delete_by_username(&self, username: &str) -> Result<u64, RepositoryError>;
}
