//! Gateways that reach agents and reviewers outside the process

mod error;
mod process;

pub use error::ProcessError;
pub use process::ProcessGateway;
