//! Response envelope shared by the gateway and the data service.

use serde::{Deserialize, Serialize};

/// Outcome tag of an [`Envelope`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// `{status, content}` wrapper returned by every account endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: Status,
    pub content: serde_json::Value,
}

impl Envelope {
    pub fn success(content: impl Into<serde_json::Value>) -> Self {
        Self {
            status: Status::Success,
            content: content.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            content: serde_json::Value::String(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}
