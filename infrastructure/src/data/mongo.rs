//! MongoDB-backed document store.

use async_trait::async_trait;
use futures::TryStreamExt;
use kowalski_application::{Document, DocumentStore, FindQuery, StoreError, UpdateCounts};
use mongodb::bson::{self, Bson, Document as BsonDocument, doc, oid::ObjectId};
use mongodb::options::{ClientOptions, FindOptions};
use mongodb::{Client, Collection};
use serde_json::Value;
use tracing::info;

pub struct MongoDocumentStore {
    client: Client,
}

fn query_error(e: mongodb::error::Error) -> StoreError {
    StoreError::Query(e.to_string())
}

impl MongoDocumentStore {
    /// Connect with a `mongodb://` connection string and ping the server.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = ClientOptions::parse(url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        let client =
            Client::with_options(options).map_err(|e| StoreError::Connection(e.to_string()))?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        info!("MongoDB connected");
        Ok(Self { client })
    }

    fn collection(&self, database: &str, collection: &str) -> Collection<BsonDocument> {
        self.client.database(database).collection(collection)
    }
}

/// JSON object to BSON. A string `_id` that spells an ObjectId is matched
/// against the native id.
fn to_bson(document: &Document) -> Result<BsonDocument, StoreError> {
    let mut converted =
        bson::to_document(document).map_err(|e| StoreError::InvalidDocument(e.to_string()))?;
    if let Ok(id) = converted.get_str("_id")
        && let Ok(oid) = ObjectId::parse_str(id)
    {
        converted.insert("_id", oid);
    }
    Ok(converted)
}

fn stringify_ids(value: Bson) -> Bson {
    match value {
        Bson::ObjectId(oid) => Bson::String(oid.to_hex()),
        Bson::Document(doc) => Bson::Document(
            doc.into_iter()
                .map(|(k, v)| (k, stringify_ids(v)))
                .collect(),
        ),
        Bson::Array(items) => Bson::Array(items.into_iter().map(stringify_ids).collect()),
        other => other,
    }
}

/// BSON to JSON with every ObjectId rendered as its hex string.
fn from_bson(document: BsonDocument) -> Document {
    match stringify_ids(Bson::Document(document)).into_relaxed_extjson() {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}

fn id_to_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn list_databases(&self) -> Result<Vec<String>, StoreError> {
        self.client
            .list_database_names(None, None)
            .await
            .map_err(query_error)
    }

    async fn list_collections(&self, database: &str) -> Result<Vec<String>, StoreError> {
        self.client
            .database(database)
            .list_collection_names(None)
            .await
            .map_err(query_error)
    }

    async fn find_one(
        &self,
        database: &str,
        collection: &str,
        filter: &Document,
    ) -> Result<Option<Document>, StoreError> {
        let found = self
            .collection(database, collection)
            .find_one(to_bson(filter)?, None)
            .await
            .map_err(query_error)?;
        Ok(found.map(from_bson))
    }

    async fn find(
        &self,
        database: &str,
        collection: &str,
        query: &FindQuery,
    ) -> Result<Vec<Document>, StoreError> {
        let mut options = FindOptions::default();
        if let Some(fields) = &query.projection {
            let mut projection = BsonDocument::new();
            for field in fields {
                projection.insert(field.as_str(), 1);
            }
            options.projection = Some(projection);
        }
        if let Some(limit) = query.limit.filter(|l| *l > 0) {
            options.limit = Some(limit as i64);
        }

        let cursor = self
            .collection(database, collection)
            .find(to_bson(&query.filter)?, options)
            .await
            .map_err(query_error)?;
        let docs: Vec<BsonDocument> = cursor.try_collect().await.map_err(query_error)?;
        Ok(docs.into_iter().map(from_bson).collect())
    }

    async fn insert_many(
        &self,
        database: &str,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<String>, StoreError> {
        let count = documents.len();
        let converted = documents
            .iter()
            .map(to_bson)
            .collect::<Result<Vec<_>, _>>()?;
        let result = self
            .collection(database, collection)
            .insert_many(converted, None)
            .await
            .map_err(query_error)?;

        (0..count)
            .map(|index| {
                result
                    .inserted_ids
                    .get(&index)
                    .map(id_to_string)
                    .ok_or_else(|| StoreError::Query(format!("no id reported for record {}", index)))
            })
            .collect()
    }

    async fn update(
        &self,
        database: &str,
        collection: &str,
        filter: &Document,
        set: &Document,
        multi: bool,
    ) -> Result<UpdateCounts, StoreError> {
        let filter = to_bson(filter)?;
        let set = bson::to_document(set).map_err(|e| StoreError::InvalidDocument(e.to_string()))?;
        let update = doc! { "$set": set };
        let coll = self.collection(database, collection);
        let result = if multi {
            coll.update_many(filter, update, None).await
        } else {
            coll.update_one(filter, update, None).await
        }
        .map_err(query_error)?;

        Ok(UpdateCounts {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn delete_many(
        &self,
        database: &str,
        collection: &str,
        filter: &Document,
    ) -> Result<u64, StoreError> {
        let result = self
            .collection(database, collection)
            .delete_many(to_bson(filter)?, None)
            .await
            .map_err(query_error)?;
        Ok(result.deleted_count)
    }
}
