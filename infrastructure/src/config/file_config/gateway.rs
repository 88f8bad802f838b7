//! Gateway configuration (`[gateway]` section)

use serde::{Deserialize, Serialize};

/// Raw gateway configuration from TOML
///
/// ```toml
/// [gateway]
/// bind = "127.0.0.1:8080"
/// require_auth = false        # require a session token on /chat
/// auth_database = "auth-demo" # database holding users and sessions
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGatewayConfig {
    pub bind: String,
    pub require_auth: bool,
    pub auth_database: String,
}

impl Default for FileGatewayConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            require_auth: false,
            auth_database: "auth-demo".to_string(),
        }
    }
}
