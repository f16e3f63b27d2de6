//! Orchestration domain
//!
//! Phases of one orchestrated request and the outcome returned to callers.

pub mod entities;
pub mod value_objects;

pub use entities::Phase;
pub use value_objects::OrchestrationOutcome;
