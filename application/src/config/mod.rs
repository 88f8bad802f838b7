//! Application-level configuration.
//!
//! - [`ExecutionParams`]: agent loop control (tool round budget)

pub mod execution_params;

pub use execution_params::ExecutionParams;
