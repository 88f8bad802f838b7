//! Presentation layer for kowalski
//!
//! This crate contains the HTTP surfaces (the gateway and the generic
//! JSON-RPC tool server) and the CLI definitions.

pub mod cli;
pub mod http;

// Re-export commonly used types
pub use cli::commands::{Cli, Command};
pub use http::{
    gateway::{GatewayState, gateway_router},
    serve,
    tool_server::tool_server_router,
};
