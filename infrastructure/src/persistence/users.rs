use std::sync::Arc;

use async_trait::async_trait;
use kowalski_application::{DocumentStore, RepositoryError, UserRepository};
use kowalski_domain::User;
use tokio::sync::Mutex;

use super::{USERS_COLLECTION, by_username, from_document, to_document};

pub struct DocumentUserRepository {
    store: Arc<dyn DocumentStore>,
    database: String,
    /// Serializes the check-then-insert of registrations.
    insert_lock: Mutex<()>,
}

impl DocumentUserRepository {
    pub fn new(store: Arc<dyn DocumentStore>, database: impl Into<String>) -> Self {
        Self {
            store,
            database: database.into(),
            insert_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl UserRepository for DocumentUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let found = self
            .store
            .find_one(&self.database, USERS_COLLECTION, &by_username(username))
            .await?;
        found.map(from_document).transpose()
    }

    async fn insert(&self, user: User) -> Result<User, RepositoryError> {
        let _guard = self.insert_lock.lock().await;

        if self.find_by_username(&user.username).await?.is_some() {
            return Err(RepositoryError::AlreadyExists(user.username));
        }

        let ids = self
            .store
            .insert_many(&self.database, USERS_COLLECTION, vec![to_document(&user)?])
            .await?;
        let id = ids
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::Malformed("store reported no id".to_string()))?;
        Ok(user.with_id(id))
    }
}
