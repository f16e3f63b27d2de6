//! Port definitions for the application layer
//!
//! Ports define interfaces that adapters in the infrastructure and
//! presentation layers implement.

pub mod agent_gateway;
pub mod audit_log;
pub mod context_provider;
pub mod progress;
pub mod registry_store;
pub mod reviewer_gateway;
