//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod calibrate;
pub mod execute_agents;
pub mod load_registry;
pub mod orchestrate;
pub mod run_council;
pub(crate) mod shared;
#[cfg(test)]
pub(crate) mod test_support;

pub use shared::SessionClock;
