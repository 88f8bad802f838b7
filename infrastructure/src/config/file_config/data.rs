//! Data server configuration (`[data]` section)

use serde::{Deserialize, Serialize};

/// Which document store backs the data server and the account repositories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Process-local store; contents are lost on exit
    Memory,
    /// MongoDB at `data.url`
    Mongo,
}

/// Raw data configuration from TOML
///
/// The connection string is normally supplied through `MONGO_URL`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDataConfig {
    pub bind: String,
    pub store: StoreKind,
    pub url: String,
}

impl Default for FileDataConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8001".to_string(),
            store: StoreKind::Mongo,
            url: "mongodb://localhost:27017/".to_string(),
        }
    }
}
