//! Script sandbox configuration (`[sandbox]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw sandbox configuration from TOML
///
/// ```toml
/// [sandbox]
/// bind = "127.0.0.1:8002"
/// workspace = "workspace"
/// extension = ".py"
/// interpreter = "python3"
/// default_timeout_secs = 30
/// max_timeout_secs = 60
/// cpu_limit_secs = 60     # 0 disables
/// memory_limit_mb = 2048  # 0 disables
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSandboxConfig {
    pub bind: String,
    pub workspace: PathBuf,
    pub extension: String,
    pub interpreter: String,
    pub default_timeout_secs: u64,
    pub max_timeout_secs: u64,
    pub cpu_limit_secs: u64,
    pub memory_limit_mb: u64,
}

impl Default for FileSandboxConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8002".to_string(),
            workspace: PathBuf::from("workspace"),
            extension: ".py".to_string(),
            interpreter: "python3".to_string(),
            default_timeout_secs: 30,
            max_timeout_secs: 60,
            cpu_limit_secs: 60,
            memory_limit_mb: 2048,
        }
    }
}
