use std::sync::Arc;

use async_trait::async_trait;
use kowalski_application::{DocumentStore, FindQuery, RepositoryError, SessionRepository};
use kowalski_domain::Session;
use tracing::warn;

use super::{SESSIONS_COLLECTION, by_username, from_document, to_document};

pub struct DocumentSessionRepository {
    store: Arc<dyn DocumentStore>,
    database: String,
}

impl DocumentSessionRepository {
    pub fn new(store: Arc<dyn DocumentStore>, database: impl Into<String>) -> Self {
        Self {
            store,
            database: database.into(),
        }
    }
}

#[async_trait]
impl SessionRepository for DocumentSessionRepository {
    /// Rows that do not parse as sessions are skipped.
    async fn load_all(&self) -> Result<Vec<Session>, RepositoryError> {
        let rows = self
            .store
            .find(&self.database, SESSIONS_COLLECTION, &FindQuery::default())
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| match from_document::<Session>(row) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!(error = %e, "Skipping malformed session row");
                    None
                }
            })
            .collect())
    }

    async fn insert(&self, session: &Session) -> Result<(), RepositoryError> {
        self.store
            .insert_many(&self.database, SESSIONS_COLLECTION, vec![to_document(session)?])
            .await?;
        Ok(())
    }

    async fn delete_by_username(&self, username: &str) -> Result<u64, RepositoryError> {
        Ok(self
            .store
            .delete_many(&self.database, SESSIONS_COLLECTION, &by_username(username))
            .await?)
    }
}
