//! Application layer for kowalski
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod session_store;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    document_store::{Document, DocumentStore, FindQuery, StoreError, UpdateCounts},
    llm_gateway::{GatewayError, LlmGateway, LlmSession, ToolResultMessage},
    password_hasher::PasswordHasher,
    repository::{RepositoryError, SessionRepository, UserRepository},
    tool_executor::{RegistryError, ToolDiscoveryPort, ToolExecutorPort},
};
pub use session_store::{SessionError, SessionStore};
pub use use_cases::accounts::{AccountService, AuthError, LoginOutcome};
pub use use_cases::chat::{ChatOutput, ChatUseCase};
pub use use_cases::run_agent::{RunAgentError, RunAgentInput, RunAgentOutput, RunAgentUseCase};
