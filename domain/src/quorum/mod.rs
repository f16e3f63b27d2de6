//! Dispatch quorum
//!
//! After every agent call settles, the fraction of successful results is
//! compared against the [`QuorumFloor`]. Below the floor the failed subset is
//! dispatched once more; whatever quorum results is accepted and the session
//! is flagged degraded if it is still short.

pub mod rule;
pub mod status;

pub use rule::QuorumFloor;
pub use status::QuorumStatus;
