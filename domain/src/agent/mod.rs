//! Agent domain module
//!
//! The agent alternates between asking the reasoning engine for a generation
//! and dispatching the tool calls it requested, until the engine answers
//! without tool calls or the round budget runs out.
//!
//! ```text
//! AwaitingGeneration ──▶ DispatchingTools ──▶ AwaitingGeneration ──▶ … ──▶ Final
//!                                  └────────────────────────────────────▶ Incomplete
//! ```

pub mod entities;

pub use entities::{AgentOutcome, AgentPhase, AgentStep, RunTrace};
