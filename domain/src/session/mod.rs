//! Session domain.
//!
//! - [`entities::Session`]: an authenticated login session
//! - [`response::LlmResponse`]: a structured reply from the reasoning engine

pub mod entities;
pub mod response;
