//! Configuration file loading for kowalski
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Well-known secrets: `GOOGLE_API_KEY`, `OPENWEATHER_API_KEY`, `MONGO_URL`
//! 2. `KOWALSKI_*` environment variables (`__` separates nested keys)
//! 3. `--config <path>` specified file
//! 4. Project root: `./kowalski.toml`
//! 5. Global: `~/.config/kowalski/config.toml`
//! 6. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAgentConfig, FileBackendConfig, FileConfig, FileDataConfig,
    FileGatewayConfig, FileLoggingConfig, FileSandboxConfig, FileSearchConfig, StoreKind,
};
pub use loader::ConfigLoader;
