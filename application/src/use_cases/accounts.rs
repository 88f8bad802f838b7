//! Account use cases: register, login, logout, authenticate.

use crate::ports::password_hasher::PasswordHasher;
use crate::ports::repository::{RepositoryError, UserRepository};
use crate::session_store::{SessionError, SessionStore};
use kowalski_domain::{DomainError, User, UserView, validate_username};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors surfaced by account operations.
///
/// The display strings of the first four variants are part of the HTTP
/// contract and returned to clients verbatim.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("username already exists")]
    UsernameTaken,

    #[error("Username doesn't exist")]
    UnknownUser,

    #[error("Password doesn't match")]
    WrongPassword,

    #[error("Invalid session")]
    InvalidSession,

    #[error(transparent)]
    InvalidInput(#[from] DomainError),

    #[error("Repository error: {0}")]
    Repository(RepositoryError),

    #[error("Session error: {0}")]
    Session(SessionError),
}

impl AuthError {
    /// Whether the error is the caller's fault rather than a backend fault
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AuthError::Repository(_) | AuthError::Session(_))
    }
}

impl From<RepositoryError> for AuthError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::AlreadyExists(_) => AuthError::UsernameTaken,
            other => AuthError::Repository(other),
        }
    }
}

impl From<SessionError> for AuthError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotFound => AuthError::InvalidSession,
            other => AuthError::Session(other),
        }
    }
}

/// Successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginOutcome {
    pub user: UserView,
    pub session_id: String,
}

/// Account service shared by the gateway endpoints
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    sessions: Arc<SessionStore>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        sessions: Arc<SessionStore>,
    ) -> Self {
        Self {
            users,
            hasher,
            sessions,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Create an account. Usernames are unique.
    pub async fn register(&self, username: &str, password: &str) -> Result<UserView, AuthError> {
        validate_username(username)?;
        if self.users.find_by_username(username).await?.is_some() {
            warn!(username = %username, "Registration rejected: username taken");
            return Err(AuthError::UsernameTaken);
        }

        let user = User::new(username, self.hasher.hash(password));
        // The repository re-checks atomically; a concurrent registration
        // that slipped past the lookup above surfaces as UsernameTaken.
        let created = self.users.insert(user).await?;
        info!(username = %username, "User registered");
        Ok(created.view())
    }

    /// Verify credentials and issue a session.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(AuthError::UnknownUser)?;

        if !self.hasher.verify(password, &user.password_hash) {
            warn!(username = %username, "Login rejected: wrong password");
            return Err(AuthError::WrongPassword);
        }

        let session_id = self.sessions.create(username).await?;
        info!(username = %username, "User logged in");
        Ok(LoginOutcome {
            user: user.view(),
            session_id,
        })
    }

    /// End every session of the user owning `token`.
    pub async fn logout(&self, token: &str) -> Result<usize, AuthError> {
        let username = self.authenticate(token).await?;
        Ok(self.sessions.invalidate_all(&username).await?)
    }

    /// Resolve a session token to its username.
    pub async fn authenticate(&self, token: &str) -> Result<String, AuthError> {
        if token.is_empty() {
            return Err(AuthError::InvalidSession);
        }
        Ok(self.sessions.resolve(token).await?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::session_store::tests::MemorySessionRepository;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// User repository backed by a vector
    #[derive(Default)]
    pub(crate) struct MemoryUserRepository {
        pub users: Mutex<Vec<User>>,
    }

    #[async_trait]
    impl UserRepository for MemoryUserRepository {
        async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.username == username)
                .cloned())
        }

        async fn insert(&self, user: User) -> Result<User, RepositoryError> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.username == user.username) {
                return Err(RepositoryError::AlreadyExists(user.username));
            }
            let user = user.with_id(format!("id-{}", users.len() + 1));
            users.push(user.clone());
            Ok(user)
        }
    }

    /// Reversible "hash" for tests
    pub(crate) struct PlainHasher;

    impl PasswordHasher for PlainHasher {
        fn hash(&self, password: &str) -> String {
            format!("plain${password}")
        }

        fn verify(&self, password: &str, hashed: &str) -> bool {
            hashed == self.hash(password)
        }
    }

    async fn service() -> (AccountService, Arc<MemoryUserRepository>) {
        let users = Arc::new(MemoryUserRepository::default());
        let sessions =
            Arc::new(SessionStore::init(Arc::new(MemorySessionRepository::default())).await);
        (
            AccountService::new(users.clone(), Arc::new(PlainHasher), sessions),
            users,
        )
    }

    #[tokio::test]
    async fn test_register_twice() {
        let (svc, users) = service().await;

        let view = svc.register("alice", "pw").await.unwrap();
        assert_eq!(view.username, "alice");
        assert_eq!(view.id, "id-1");

        let err = svc.register("alice", "other").await.unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken));
        assert_eq!(err.to_string(), "username already exists");
        assert_eq!(users.users.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_register_rejects_blank_username() {
        let (svc, _) = service().await;
        let err = svc.register("  ", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidInput(_)));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_login_errors() {
        let (svc, _) = service().await;
        svc.register("alice", "pw").await.unwrap();

        let err = svc.login("bob", "pw").await.unwrap_err();
        assert_eq!(err.to_string(), "Username doesn't exist");

        let err = svc.login("alice", "nope").await.unwrap_err();
        assert_eq!(err.to_string(), "Password doesn't match");
    }

    #[tokio::test]
    async fn test_two_logins_then_logout_invalidates_both() {
        let (svc, _) = service().await;
        svc.register("alice", "pw").await.unwrap();

        let first = svc.login("alice", "pw").await.unwrap();
        let second = svc.login("alice", "pw").await.unwrap();
        assert_ne!(first.session_id, second.session_id);
        assert_eq!(first.user.username, "alice");

        assert_eq!(svc.logout(&second.session_id).await.unwrap(), 2);
        assert!(matches!(
            svc.authenticate(&first.session_id).await,
            Err(AuthError::InvalidSession)
        ));
        assert!(matches!(
            svc.logout(&first.session_id).await,
            Err(AuthError::InvalidSession)
        ));
    }

    #[tokio::test]
    async fn test_logout_without_token() {
        let (svc, _) = service().await;
        let err = svc.logout("").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid session");
    }
}
