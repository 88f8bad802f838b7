//! Tool registry and the remote tool protocol client
//!
//! ## Providers
//!
//! Every backend service is reached through a [`RemoteToolProvider`]. The
//! [`ToolRegistry`] merges what they advertise and routes calls by name.
//! [`ProviderSetDiscovery`] rebuilds the registry for each agent run.

mod registry;
mod remote;

pub use registry::{ProviderSetDiscovery, ToolRegistry};
pub use remote::RemoteToolProvider;
