//! Agent configuration from TOML (`[agent]` section)

use serde::{Deserialize, Serialize};

/// A tool backend the agent discovers tools from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileBackendConfig {
    /// Provider id used in logs and collision reports
    pub name: String,
    /// JSON-RPC endpoint, e.g. `http://127.0.0.1:8000/mcp`
    pub url: String,
}

impl FileBackendConfig {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Raw agent configuration from TOML
///
/// ```toml
/// [agent]
/// model = "gemini-2.5-flash"
/// max_tool_rounds = 15
/// llm_timeout_secs = 120
/// tool_timeout_secs = 90
///
/// [[agent.backends]]
/// name = "search"
/// url = "http://127.0.0.1:8000/mcp"
/// ```
///
/// The API key is normally supplied through `GOOGLE_API_KEY`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub api_base: String,
    pub max_tool_rounds: usize,
    pub llm_timeout_secs: u64,
    pub tool_timeout_secs: u64,
    pub backends: Vec<FileBackendConfig>,
}

impl Default for FileAgentConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            api_key: None,
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            max_tool_rounds: 15,
            llm_timeout_secs: 120,
            tool_timeout_secs: 90,
            backends: vec![
                FileBackendConfig::new("search", "http://127.0.0.1:8000/mcp"),
                FileBackendConfig::new("database", "http://127.0.0.1:8001/mcp"),
                FileBackendConfig::new("scripts", "http://127.0.0.1:8002/mcp"),
            ],
        }
    }
}
