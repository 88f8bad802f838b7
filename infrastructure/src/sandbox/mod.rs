//! Script sandbox
//!
//! One flat workspace directory of scripts plus an execution harness that
//! bounds every run by wall-clock time, process group and rlimits.
//! [`ScriptToolProvider`] exposes it as the `list_scripts`, `write_script`,
//! `read_script` and `run_script` tools.

mod error;
mod provider;
mod runner;
mod workspace;

pub use error::SandboxError;
pub use provider::ScriptToolProvider;
pub use runner::{ResourceLimits, RunOutput, ScriptRunner};
pub use workspace::ScriptWorkspace;
