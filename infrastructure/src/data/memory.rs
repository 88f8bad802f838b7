//! Process-local document store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use kowalski_application::{Document, DocumentStore, FindQuery, StoreError, UpdateCounts};
use serde_json::Value;
use tokio::sync::RwLock;

use super::filter::matches;

type Collections = BTreeMap<String, Vec<Document>>;

/// In-memory [`DocumentStore`]. Documents get uuid `_id`s on insert.
#[derive(Default)]
pub struct MemoryDocumentStore {
    databases: RwLock<BTreeMap<String, Collections>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn project(doc: &Document, fields: Option<&[String]>) -> Document {
    let Some(fields) = fields else {
        return doc.clone();
    };
    doc.iter()
        .filter(|(k, _)| k.as_str() == "_id" || fields.iter().any(|f| f == *k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn list_databases(&self) -> Result<Vec<String>, StoreError> {
        let databases = self.databases.read().await;
        Ok(databases
            .iter()
            .filter(|(_, collections)| !collections.is_empty())
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn list_collections(&self, database: &str) -> Result<Vec<String>, StoreError> {
        let databases = self.databases.read().await;
        Ok(databases
            .get(database)
            .map(|c| c.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn find_one(
        &self,
        database: &str,
        collection: &str,
        filter: &Document,
    ) -> Result<Option<Document>, StoreError> {
        let docs = self
            .find(database, collection, &FindQuery::new(filter.clone()).with_limit(1))
            .await?;
        Ok(docs.into_iter().next())
    }

    async fn find(
        &self,
        database: &str,
        collection: &str,
        query: &FindQuery,
    ) -> Result<Vec<Document>, StoreError> {
        let databases = self.databases.read().await;
        let Some(docs) = databases.get(database).and_then(|c| c.get(collection)) else {
            return Ok(Vec::new());
        };

        // A limit of zero means no limit.
        let limit = match query.limit {
            Some(0) | None => usize::MAX,
            Some(n) => n as usize,
        };

        let mut found = Vec::new();
        for doc in docs {
            if found.len() >= limit {
                break;
            }
            if matches(doc, &query.filter)? {
                found.push(project(doc, query.projection.as_deref()));
            }
        }
        Ok(found)
    }

    async fn insert_many(
        &self,
        database: &str,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<String>, StoreError> {
        let mut databases = self.databases.write().await;
        let docs = databases
            .entry(database.to_string())
            .or_default()
            .entry(collection.to_string())
            .or_default();

        let mut prepared = Vec::with_capacity(documents.len());
        let mut ids = Vec::with_capacity(documents.len());
        for mut doc in documents {
            let id = match doc.get("_id") {
                None | Some(Value::Null) => uuid::Uuid::new_v4().simple().to_string(),
                Some(Value::String(id)) => id.clone(),
                Some(other) => other.to_string(),
            };
            let taken = docs
                .iter()
                .chain(prepared.iter())
                .any(|d: &Document| d.get("_id").and_then(Value::as_str) == Some(id.as_str()));
            if taken {
                return Err(StoreError::Query(format!("duplicate key _id: {}", id)));
            }
            doc.insert("_id".to_string(), Value::String(id.clone()));
            prepared.push(doc);
            ids.push(id);
        }

        docs.extend(prepared);
        Ok(ids)
    }

    async fn update(
        &self,
        database: &str,
        collection: &str,
        filter: &Document,
        set: &Document,
        multi: bool,
    ) -> Result<UpdateCounts, StoreError> {
        if set.contains_key("_id") {
            return Err(StoreError::Query(
                "the immutable field '_id' cannot be updated".to_string(),
            ));
        }

        let mut databases = self.databases.write().await;
        let Some(docs) = databases
            .get_mut(database)
            .and_then(|c| c.get_mut(collection))
        else {
            return Ok(UpdateCounts::default());
        };

        let mut selected = matching_positions(docs, filter)?;
        if !multi {
            selected.truncate(1);
        }

        let mut counts = UpdateCounts::default();
        for index in selected {
            let doc = &mut docs[index];
            counts.matched += 1;
            let mut changed = false;
            for (field, value) in set {
                if doc.get(field) != Some(value) {
                    doc.insert(field.clone(), value.clone());
                    changed = true;
                }
            }
            if changed {
                counts.modified += 1;
            }
        }
        Ok(counts)
    }

    async fn delete_many(
        &self,
        database: &str,
        collection: &str,
        filter: &Document,
    ) -> Result<u64, StoreError> {
        let mut databases = self.databases.write().await;
        let Some(docs) = databases
            .get_mut(database)
            .and_then(|c| c.get_mut(collection))
        else {
            return Ok(0);
        };

        let selected = matching_positions(docs, filter)?;
        let mut index = 0;
        docs.retain(|_| {
            let keep = selected.binary_search(&index).is_err();
            index += 1;
            keep
        });
        Ok(selected.len() as u64)
    }
}

/// Indices of the documents matching `filter`. The filter is evaluated
/// against every document before any is touched, so an error leaves the
/// collection as it was.
fn matching_positions(docs: &[Document], filter: &Document) -> Result<Vec<usize>, StoreError> {
    let mut positions = Vec::new();
    for (index, doc) in docs.iter().enumerate() {
        if matches(doc, filter)? {
            positions.push(index);
        }
    }
    Ok(positions)
}
