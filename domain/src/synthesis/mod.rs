//! Weighted synthesis of agent results
//!
//! Turns the successful [`AgentResult`](crate::agent::AgentResult)s of one
//! dispatch into normalized per-agent weights and a ranked list of
//! recommended actions.

pub mod engine;
pub mod report;

pub use engine::synthesize;
pub use report::{RankedAction, SynthesisReport};
