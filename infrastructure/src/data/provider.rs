//! Data tools exposed through [`ToolProvider`].

use async_trait::async_trait;
use kowalski_application::Document;
use kowalski_domain::tool::{
    entities::{ToolCall, ToolDefinition, ToolParameter},
    provider::{ProviderError, ToolProvider},
    value_objects::{ToolError, ToolResult},
};
use serde_json::{Value, json};

use super::service::DataService;

pub const GET_DATABASES: &str = "get_databases";
pub const GET_COLLECTIONS: &str = "get_collections";
pub const GET_FIELDS: &str = "get_fields_for_collection";
pub const ADD_RECORD: &str = "add_record";
pub const UPDATE_RECORD: &str = "update_record";
pub const READ_RECORDS: &str = "read_records";

pub struct DataToolProvider {
    service: DataService,
}

fn database() -> ToolParameter {
    ToolParameter::new("database", "Database name", true)
}

fn collection() -> ToolParameter {
    ToolParameter::new("collection", "Collection (table) name", true)
}

impl DataToolProvider {
    pub fn new(service: DataService) -> Self {
        Self { service }
    }

    fn definitions() -> Vec<ToolDefinition> {
        vec![
            ToolDefinition::new(
                GET_DATABASES,
                "Fetch a list of all available databases in the datastore.",
            ),
            ToolDefinition::new(
                GET_COLLECTIONS,
                "Fetch all collection (table) names inside a given database.",
            )
            .with_parameter(database()),
            ToolDefinition::new(
                GET_FIELDS,
                "Fetch the field names of a collection, sampled from one record.",
            )
            .with_parameter(database())
            .with_parameter(collection()),
            ToolDefinition::new(
                ADD_RECORD,
                "Insert one or more documents (records) into a given database and collection.",
            )
            .with_parameter(database())
            .with_parameter(collection())
            .with_parameter(
                ToolParameter::new("records", "Documents to insert", true)
                    .with_items(json!({"type": "object"})),
            ),
            ToolDefinition::new(
                UPDATE_RECORD,
                "Update documents whose `filter_field` equals `filter_value` by setting \
                 `update_field` to `update_value`. Set `update_multiple_records` to update \
                 every match instead of only the first.",
            )
            .with_parameter(database())
            .with_parameter(collection())
            .with_parameter(ToolParameter::new("filter_field", "Field to match on", true))
            .with_parameter(ToolParameter::new("filter_value", "Value to match", true))
            .with_parameter(ToolParameter::new("update_field", "Field to set", true))
            .with_parameter(ToolParameter::new("update_value", "New value", true))
            .with_parameter(
                ToolParameter::new(
                    "update_multiple_records",
                    "Update all matches (true) or only one (false)",
                    true,
                )
                .with_type("boolean"),
            ),
            ToolDefinition::new(
                READ_RECORDS,
                "Read documents from a collection. `query_filter` is a filter object such as \
                 {\"age\": {\"$gt\": 25}} or {\"status\": {\"$in\": [\"active\"]}}; \
                 `projection` lists the fields to return; `limit` caps the number of records.",
            )
            .with_parameter(database())
            .with_parameter(collection())
            .with_parameter(
                ToolParameter::new("query_filter", "Filter object (default: all records)", false)
                    .with_type("object"),
            )
            .with_parameter(
                ToolParameter::new("projection", "Field names to include", false)
                    .with_items(json!({"type": "string"})),
            )
            .with_parameter(
                ToolParameter::new("limit", "Maximum number of records", false)
                    .with_type("integer"),
            ),
        ]
    }

    async fn dispatch(&self, call: &ToolCall) -> Result<Value, ToolError> {
        let text = |key: &str| call.require_string(key).map_err(ToolError::invalid_argument);
        let value = |key: &str| {
            call.arguments
                .get(key)
                .cloned()
                .ok_or_else(|| ToolError::invalid_argument(format!("Missing required argument: {}", key)))
        };

        match call.tool_name.as_str() {
            GET_DATABASES => Ok(self.service.get_databases().await),
            GET_COLLECTIONS => Ok(self.service.get_collections(text("database")?).await),
            GET_FIELDS => Ok(self
                .service
                .get_fields_for_collection(text("database")?, text("collection")?)
                .await),
            ADD_RECORD => {
                let records = parse_records(&value("records")?)?;
                Ok(self
                    .service
                    .add_record(text("database")?, text("collection")?, records)
                    .await)
            }
            UPDATE_RECORD => Ok(self
                .service
                .update_record(
                    text("database")?,
                    text("collection")?,
                    text("filter_field")?,
                    value("filter_value")?,
                    text("update_field")?,
                    value("update_value")?,
                    call.get_bool("update_multiple_records").unwrap_or(false),
                )
                .await),
            READ_RECORDS => {
                let filter = match call.get_value("query_filter") {
                    None => None,
                    Some(Value::Object(map)) => Some(map.clone()),
                    Some(_) => {
                        return Err(ToolError::invalid_argument("query_filter must be an object"));
                    }
                };
                let projection = match call.get_value("projection") {
                    None => None,
                    Some(Value::Array(items)) => Some(
                        items
                            .iter()
                            .filter_map(|f| f.as_str().map(str::to_string))
                            .collect(),
                    ),
                    Some(_) => {
                        return Err(ToolError::invalid_argument("projection must be a list of field names"));
                    }
                };
                let limit = call.get_i64("limit").filter(|l| *l > 0).map(|l| l as u64);
                Ok(self
                    .service
                    .read_records(text("database")?, text("collection")?, filter, projection, limit)
                    .await)
            }
            other => Err(ToolError::not_found(format!("Tool not found: {}", other))),
        }
    }
}

/// A single object is accepted as a one-record list.
fn parse_records(value: &Value) -> Result<Vec<Document>, ToolError> {
    let items = match value {
        Value::Array(items) => items.as_slice(),
        Value::Object(_) => std::slice::from_ref(value),
        _ => return Err(ToolError::invalid_argument("records must be a list of objects")),
    };
    if items.is_empty() {
        return Err(ToolError::invalid_argument("records must not be empty"));
    }
    items
        .iter()
        .map(|item| {
            item.as_object()
                .cloned()
                .ok_or_else(|| ToolError::invalid_argument("every record must be an object"))
        })
        .collect()
}

#[async_trait]
impl ToolProvider for DataToolProvider {
    fn id(&self) -> &str {
        "database"
    }

    fn display_name(&self) -> &str {
        "Data Service"
    }

    async fn discover_tools(&self) -> Result<Vec<ToolDefinition>, ProviderError> {
        Ok(Self::definitions())
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        match self.dispatch(call).await {
            Ok(output) => ToolResult::success(&call.tool_name, output),
            Err(error) => ToolResult::failure(&call.tool_name, error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MemoryDocumentStore;
    use std::sync::Arc;

    fn provider() -> DataToolProvider {
        DataToolProvider::new(DataService::new(Arc::new(MemoryDocumentStore::new())))
    }

    #[tokio::test]
    async fn test_add_then_read_through_tools() {
        let data = provider();
        let added = data
            .execute(
                &ToolCall::new(ADD_RECORD)
                    .with_arg("database", "db")
                    .with_arg("collection", "notes")
                    .with_arg("records", json!([{"text": "hi"}, {"text": "there"}])),
            )
            .await;
        assert!(added.is_success());
        assert_eq!(added.output().unwrap()["inserted_ids"].as_array().unwrap().len(), 2);

        let read = data
            .execute(
                &ToolCall::new(READ_RECORDS)
                    .with_arg("database", "db")
                    .with_arg("collection", "notes")
                    .with_arg("query_filter", json!({"text": "hi"})),
            )
            .await;
        assert_eq!(read.output().unwrap()["count"], 1);
    }

    #[tokio::test]
    async fn test_records_must_be_objects() {
        let result = provider()
            .execute(
                &ToolCall::new(ADD_RECORD)
                    .with_arg("database", "db")
                    .with_arg("collection", "c")
                    .with_arg("records", json!([1, 2])),
            )
            .await;
        assert_eq!(result.error().unwrap().code, "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn test_update_through_tool() {
        let data = provider();
        data.execute(
            &ToolCall::new(ADD_RECORD)
                .with_arg("database", "db")
                .with_arg("collection", "c")
                .with_arg("records", json!({"k": "a", "v": 1})),
        )
        .await;

        let updated = data
            .execute(
                &ToolCall::new(UPDATE_RECORD)
                    .with_arg("database", "db")
                    .with_arg("collection", "c")
                    .with_arg("filter_field", "k")
                    .with_arg("filter_value", "a")
                    .with_arg("update_field", "v")
                    .with_arg("update_value", 2)
                    .with_arg("update_multiple_records", false),
            )
            .await;
        let output = updated.output().unwrap();
        assert_eq!(output["matched"], 1);
        assert_eq!(output["modified"], 1);
    }
}
