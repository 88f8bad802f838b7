use std::sync::Arc;

use kowalski_application::{Document, DocumentStore, FindQuery, StoreError};
use serde_json::{Value, json};
use tracing::{info, warn};

/// Envelope-producing facade over a [`DocumentStore`].
///
/// Every operation returns a JSON value; store failures are reported
/// inside it with `status: "error"` rather than as `Err`.
pub struct DataService {
    store: Arc<dyn DocumentStore>,
}

fn error_envelope(database: &str, collection: &str, query: &str, error: &StoreError) -> Value {
    warn!(database, collection, query, error = %error, "Data operation failed");
    json!({
        "status": "error",
        "database": database,
        "collection": collection,
        "query": query,
        "error": error.to_string(),
    })
}

impl DataService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn get_databases(&self) -> Value {
        match self.store.list_databases().await {
            Ok(databases) => json!({ "databases": databases }),
            Err(e) => json!({ "status": "error", "error": e.to_string() }),
        }
    }

    pub async fn get_collections(&self, database: &str) -> Value {
        match self.store.list_collections(database).await {
            Ok(collections) => json!({ "database": database, "collections": collections }),
            Err(e) => json!({ "status": "error", "database": database, "error": e.to_string() }),
        }
    }

    /// Keys of one sample document, skipping `_`-prefixed internals.
    pub async fn get_fields_for_collection(&self, database: &str, collection: &str) -> Value {
        match self
            .store
            .find_one(database, collection, &Document::new())
            .await
        {
            Ok(sample) => {
                let fields: Vec<String> = sample
                    .map(|doc| doc.keys().filter(|k| !k.starts_with('_')).cloned().collect())
                    .unwrap_or_default();
                json!({ "database": database, "collection": collection, "fields": fields })
            }
            Err(e) => json!({
                "status": "error",
                "database": database,
                "collection": collection,
                "error": e.to_string(),
            }),
        }
    }

    pub async fn add_record(&self, database: &str, collection: &str, records: Vec<Document>) -> Value {
        info!(database, collection, count = records.len(), "INSERT");
        match self
            .store
            .insert_many(database, collection, records.clone())
            .await
        {
            Ok(ids) => {
                let stored: Vec<Document> = records
                    .into_iter()
                    .zip(&ids)
                    .map(|(mut record, id)| {
                        record.insert("_id".to_string(), Value::String(id.clone()));
                        record
                    })
                    .collect();
                json!({
                    "status": "success",
                    "database": database,
                    "collection": collection,
                    "query": "INSERT",
                    "inserted_ids": ids,
                    "records": stored,
                })
            }
            Err(e) => error_envelope(database, collection, "INSERT", &e),
        }
    }

    /// `$set` one field on the first (or every) document whose
    /// `filter_field` equals `filter_value`.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_record(
        &self,
        database: &str,
        collection: &str,
        filter_field: &str,
        filter_value: Value,
        update_field: &str,
        update_value: Value,
        update_multiple_records: bool,
    ) -> Value {
        info!(database, collection, filter_field, update_field, multi = update_multiple_records, "UPDATE");
        let mut filter = Document::new();
        filter.insert(filter_field.to_string(), filter_value);
        let mut set = Document::new();
        set.insert(update_field.to_string(), update_value);

        match self
            .store
            .update(database, collection, &filter, &set, update_multiple_records)
            .await
        {
            Ok(counts) => json!({
                "status": "success",
                "database": database,
                "collection": collection,
                "query": "UPDATE",
                "matched": counts.matched,
                "modified": counts.modified,
            }),
            Err(e) => error_envelope(database, collection, "UPDATE", &e),
        }
    }

    pub async fn read_records(
        &self,
        database: &str,
        collection: &str,
        query_filter: Option<Document>,
        projection: Option<Vec<String>>,
        limit: Option<u64>,
    ) -> Value {
        info!(database, collection, "READ");
        let filter = query_filter.unwrap_or_default();
        let mut query = FindQuery::new(filter.clone());
        if let Some(fields) = projection.filter(|p| !p.is_empty()) {
            query = query.with_projection(fields);
        }
        if let Some(limit) = limit {
            query = query.with_limit(limit);
        }

        match self.store.find(database, collection, &query).await {
            Ok(records) => json!({
                "status": "success",
                "database": database,
                "collection": collection,
                "query": "READ",
                "query_filter": filter,
                "count": records.len(),
                "records": records,
            }),
            Err(e) => {
                let mut envelope = error_envelope(database, collection, "READ", &e);
                envelope["query_filter"] = Value::Object(filter);
                envelope
            }
        }
    }
}
