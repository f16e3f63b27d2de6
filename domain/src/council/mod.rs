//! Council review loop
//!
//! A fixed sub-roster of reviewers examines the synthesis report in bounded
//! rounds. The loop is an explicit state machine:
//!
//! ```text
//! RUNNING(1) ──quality ≥ pass──────────────> PASSED
//!     │
//!     └─quality < pass, round < max──> RUNNING(n+1)
//!     └─quality < pass, round = max──> EXHAUSTED
//! ```
//!
//! Only the [`ReviewerRole::SelfCorrection`] reviewer produces the quality
//! score; other roles inform later rounds and cost a penalty when missing.

pub mod policy;
pub mod review;
pub mod role;
pub mod round;
pub mod session;

pub use policy::CouncilPolicy;
pub use review::{ReviewRequest, ReviewStatus, ReviewerReply, ReviewerVerdict};
pub use role::ReviewerRole;
pub use round::CouncilRound;
pub use session::{CouncilSession, CouncilState, FinalVerdict};
