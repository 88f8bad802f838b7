//! Chat transcript domain.
//!
//! A [`Transcript`] is the ordered, append-only list of [`Turn`]s exchanged
//! between a user, the reasoning engine (`ai`) and tools. The gateway only
//! hands a transcript to the agent when it ends in a user turn.

pub mod entities;

pub use entities::{Role, Transcript, Turn};
