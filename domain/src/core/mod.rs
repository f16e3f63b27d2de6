//! Core domain concepts shared across all subdomains.
//!
//! - [`request::Request`] - a validated request routed through the council
//! - [`context::ContextSnapshot`] - opaque read-only context forwarded to agents
//! - [`error::CouncilError`] - domain-level error taxonomy

pub mod context;
pub mod error;
pub mod request;
