//! Infrastructure layer for kowalski
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the tool protocol client and registry, the three tool
//! backends (search, data, scripts), the Gemini gateway, document-backed
//! account storage, and configuration file loading.

pub mod auth;
pub mod config;
pub mod data;
pub mod llm;
pub mod persistence;
pub mod sandbox;
pub mod search;
pub mod tools;

// Re-export commonly used types
pub use auth::Sha256PasswordHasher;
pub use config::{
    ConfigLoader, ConfigValidationError, FileAgentConfig, FileBackendConfig, FileConfig,
    FileDataConfig, FileGatewayConfig, FileLoggingConfig, FileSandboxConfig, FileSearchConfig,
    StoreKind,
};
#[cfg(feature = "mongo")]
pub use data::MongoDocumentStore;
pub use data::{DataService, DataToolProvider, MemoryDocumentStore};
pub use llm::GeminiGateway;
pub use persistence::{DocumentSessionRepository, DocumentUserRepository};
pub use sandbox::ScriptToolProvider;
pub use search::SearchToolProvider;
pub use tools::{ProviderSetDiscovery, RemoteToolProvider, ToolRegistry};
