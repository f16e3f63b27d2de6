//! Application-level configuration.
//!
//! - [`ExecutionParams`] - dispatch control (deadline, timeouts, pool size, quorum)
//! - [`OrchestratorConfig`] - container of every policy a session needs

pub mod execution_params;
pub mod orchestrator_config;

pub use execution_params::ExecutionParams;
pub use orchestrator_config::{ConfigError, OrchestratorConfig};
