//! Document store port
//!
//! A schemaless database of named databases and collections holding JSON
//! object documents. Adapters normalize native identifiers to strings so
//! nothing store-specific leaks past this boundary.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// A document: a JSON object. `_id` is always a string once stored.
pub type Document = Map<String, Value>;

/// Errors raised by a document store
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

/// A read query
#[derive(Debug, Clone, Default)]
pub struct FindQuery {
    pub filter: Document,
    /// Allow-list of fields; `_id` is always returned
    pub projection: Option<Vec<String>>,
    pub limit: Option<u64>,
}

impl FindQuery {
    pub fn new(filter: Document) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn with_projection(mut self, fields: Vec<String>) -> Self {
        self.projection = Some(fields);
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Outcome of an update. A document whose value already equals the new value
/// counts as matched but not modified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateCounts {
    pub matched: u64,
    pub modified: u64,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_databases(&self) -> Result<Vec<String>, StoreError>;

    async fn list_collections(&self, database: &str) -> Result<Vec<String>, StoreError>;

    async fn find_one(
        &self,
        database: &str,
        collection: &str,
        filter: &Document,
    ) -> Result<Option<Document>, StoreError>;

    async fn find(
        &self,
        database: &str,
        collection: &str,
        query: &FindQuery,
    ) -> Result<Vec<Document>, StoreError>;

    /// Insert documents, returning their ids in input order.
    async fn insert_many(
        &self,
        database: &str,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<String>, StoreError>;

    /// Apply `$set: set` to the first (or every, if `multi`) match of `filter`.
    async fn update(
        &self,
        database: &str,
        collection: &str,
        filter: &Document,
        set: &Document,
        multi: bool,
    ) -> Result<UpdateCounts, StoreError>;

    async fn delete_many(
        &self,
        database: &str,
        collection: &str,
        filter: &Document,
    ) -> Result<u64, StoreError>;
}
