//! Weight registry domain
//!
//! The registry is the only long-lived mutable state of the system. It is
//! modelled as an immutable, versioned value: every write produces a new
//! [`WeightRegistry`] whose base weights are renormalized to sum to 1.0, and
//! the application layer swaps the whole value atomically.

pub mod entities;
pub mod integrity;

pub use entities::{INITIAL_EMA, RegistryEntry, WEIGHT_TOLERANCE, WeightRegistry};
pub use integrity::Reconciliation;
