//! In-memory session registry with write-through persistence.
//!
//! Maps opaque tokens to usernames. Every mutation holds the write lock
//! across the repository call, so memory and the backing store change
//! together and there is nothing to flush on shutdown.

use crate::ports::repository::{RepositoryError, SessionRepository};
use kowalski_domain::Session;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Maximum number of token draws before `create` gives up.
pub const MAX_TOKEN_ATTEMPTS: usize = 8;

/// Errors from the session store
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session not found")]
    NotFound,

    #[error("Could not draw an unused session token after {0} attempts")]
    Exhausted(usize),

    #[error("Session persistence failed: {0}")]
    Persistence(#[from] RepositoryError),
}

/// Source of fresh session tokens
pub type TokenSource = Arc<dyn Fn() -> String + Send + Sync>;

fn random_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Session registry shared by the account endpoints.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, String>>,
    repository: Arc<dyn SessionRepository>,
    token_source: TokenSource,
}

impl SessionStore {
    /// Build a store and rehydrate it from `repository`.
    ///
    /// A failed read starts the store cold rather than refusing to serve.
    pub async fn init(repository: Arc<dyn SessionRepository>) -> Self {
        let sessions = match repository.load_all().await {
            Ok(rows) => {
                info!(count = rows.len(), "Sessions synchronized");
                rows.into_iter()
                    .map(|s| (s.session_id, s.username))
                    .collect()
            }
            Err(e) => {
                warn!(error = %e, "Session synchronization failed, starting with no sessions");
                HashMap::new()
            }
        };

        Self {
            sessions: RwLock::new(sessions),
            repository,
            token_source: Arc::new(random_token),
        }
    }

    /// Replace the token generator.
    pub fn with_token_source(mut self, source: TokenSource) -> Self {
        self.token_source = source;
        self
    }

    /// Issue a new session for `username`.
    ///
    /// The row is persisted before the token becomes resolvable.
    pub async fn create(&self, username: &str) -> Result<String, SessionError> {
        let mut sessions = self.sessions.write().await;

        let mut reserved = None;
        for attempt in 1..=MAX_TOKEN_ATTEMPTS {
            let candidate = (self.token_source)();
            if sessions.contains_key(&candidate) {
                debug!(attempt, "Session token collision, drawing again");
                continue;
            }
            reserved = Some(candidate);
            break;
        }
        let token = reserved.ok_or(SessionError::Exhausted(MAX_TOKEN_ATTEMPTS))?;

        self.repository
            .insert(&Session::new(token.clone(), username))
            .await?;
        sessions.insert(token.clone(), username.to_string());

        debug!(username = %username, "Session created");
        Ok(token)
    }

    /// Look up the user that owns `session_id`.
    pub async fn resolve(&self, session_id: &str) -> Result<String, SessionError> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or(SessionError::NotFound)
    }

    /// Remove every session of `username`, in the repository and in memory.
    ///
    /// Returns the number of in-memory sessions removed. When the repository
    /// delete fails nothing is removed.
    pub async fn invalidate_all(&self, username: &str) -> Result<usize, SessionError> {
        let mut sessions = self.sessions.write().await;

        let deleted = self.repository.delete_by_username(username).await?;
        let before = sessions.len();
        sessions.retain(|_, owner| owner != username);
        let removed = before - sessions.len();

        info!(username = %username, removed, deleted, "Sessions invalidated");
        Ok(removed)
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Writes are immediate, so there is nothing to flush.
    pub async fn teardown(&self) {
        debug!("Session store shut down");
    }
}
