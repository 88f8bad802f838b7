//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly; every field has a default.

mod agent;
mod data;
mod gateway;
mod logging;
mod sandbox;
mod search;

pub use agent::{FileAgentConfig, FileBackendConfig};
pub use data::{FileDataConfig, StoreKind};
pub use gateway::FileGatewayConfig;
pub use logging::FileLoggingConfig;
pub use sandbox::FileSandboxConfig;
pub use search::FileSearchConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("{0} cannot be 0")]
    ZeroValue(&'static str),

    #[error("sandbox.extension cannot be empty")]
    EmptyExtension,

    #[error("sandbox.default_timeout_secs ({default}) exceeds sandbox.max_timeout_secs ({max})")]
    TimeoutAboveMax { default: u64, max: u64 },

    #[error("agent.tool_timeout_secs ({tool}) must exceed sandbox.max_timeout_secs ({script})")]
    ToolTimeoutBelowScript { tool: u64, script: u64 },

    #[error("agent.model cannot be empty")]
    EmptyModelName,

    #[error("agent.backends[{0}] has an empty url")]
    EmptyBackendUrl(usize),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Gateway HTTP server
    pub gateway: FileGatewayConfig,
    /// Agent loop and reasoning engine
    pub agent: FileAgentConfig,
    /// Script sandbox server
    pub sandbox: FileSandboxConfig,
    /// Search server
    pub search: FileSearchConfig,
    /// Data server and document store
    pub data: FileDataConfig,
    /// Log output
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let non_zero: [(&'static str, u64); 7] = [
            ("agent.max_tool_rounds", self.agent.max_tool_rounds as u64),
            ("agent.llm_timeout_secs", self.agent.llm_timeout_secs),
            ("agent.tool_timeout_secs", self.agent.tool_timeout_secs),
            ("sandbox.default_timeout_secs", self.sandbox.default_timeout_secs),
            ("sandbox.max_timeout_secs", self.sandbox.max_timeout_secs),
            ("search.fetch_timeout_secs", self.search.fetch_timeout_secs),
            ("search.weather_timeout_secs", self.search.weather_timeout_secs),
        ];
        if let Some((field, _)) = non_zero.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigValidationError::ZeroValue(*field));
        }

        if self.sandbox.extension.trim().is_empty() {
            return Err(ConfigValidationError::EmptyExtension);
        }
        if self.sandbox.default_timeout_secs > self.sandbox.max_timeout_secs {
            return Err(ConfigValidationError::TimeoutAboveMax {
                default: self.sandbox.default_timeout_secs,
                max: self.sandbox.max_timeout_secs,
            });
        }
        if self.agent.tool_timeout_secs <= self.sandbox.max_timeout_secs {
            return Err(ConfigValidationError::ToolTimeoutBelowScript {
                tool: self.agent.tool_timeout_secs,
                script: self.sandbox.max_timeout_secs,
            });
        }
        if self.agent.model.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName);
        }
        if let Some(index) = self
            .agent
            .backends
            .iter()
            .position(|b| b.url.trim().is_empty())
        {
            return Err(ConfigValidationError::EmptyBackendUrl(index));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = FileConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.agent.max_tool_rounds, 15);
        assert_eq!(config.sandbox.default_timeout_secs, 30);
        assert_eq!(config.agent.backends.len(), 3);
        assert!(!config.gateway.require_auth);
    }

    #[test]
    fn test_tool_timeout_must_cover_script_timeout() {
        let mut config = FileConfig::default();
        assert!(config.agent.tool_timeout_secs > config.sandbox.max_timeout_secs);

        config.sandbox.max_timeout_secs = 120;
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::ToolTimeoutBelowScript {
                tool: 90,
                script: 120
            })
        );

        config.agent.tool_timeout_secs = 120;
        assert!(config.validate().is_err());

        config.agent.tool_timeout_secs = 150;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[gateway]
bind = "0.0.0.0:9000"
require_auth = true

[agent]
max_tool_rounds = 4
backends = [{ name = "search", url = "http://search:8000/mcp" }]

[sandbox]
extension = ".sh"
interpreter = "sh"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.gateway.bind, "0.0.0.0:9000");
        assert!(config.gateway.require_auth);
        assert_eq!(config.agent.max_tool_rounds, 4);
        assert_eq!(config.agent.backends.len(), 1);
        assert_eq!(config.agent.backends[0].name, "search");
        assert_eq!(config.sandbox.extension, ".sh");
        // untouched sections keep their defaults
        assert_eq!(config.search.fetch_timeout_secs, 10);
        assert_eq!(config.agent.llm_timeout_secs, 120);
    }

    #[test]
    fn test_validate_rejects_zero_rounds() {
        let mut config = FileConfig::default();
        config.agent.max_tool_rounds = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::ZeroValue("agent.max_tool_rounds"))
        );
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = FileConfig::default();
        config.search.fetch_timeout_secs = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::ZeroValue("search.fetch_timeout_secs"))
        );
    }

    #[test]
    fn test_validate_rejects_empty_extension() {
        let mut config = FileConfig::default();
        config.sandbox.extension = String::new();
        assert_eq!(config.validate(), Err(ConfigValidationError::EmptyExtension));
    }

    #[test]
    fn test_validate_rejects_default_above_max() {
        let mut config = FileConfig::default();
        config.sandbox.default_timeout_secs = 600;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::TimeoutAboveMax { .. })
        ));
    }

    #[test]
    fn test_roundtrips_through_toml() {
        let config = FileConfig::default();
        let rendered = toml::to_string(&config).unwrap();
        let parsed: FileConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
