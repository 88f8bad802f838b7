//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod document_store;
pub mod llm_gateway;
pub mod password_hasher;
pub mod repository;
pub mod tool_executor;
