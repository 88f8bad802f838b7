//! Use cases (application services)

pub mod accounts;
pub mod chat;
pub mod run_agent;
pub(crate) mod shared;
