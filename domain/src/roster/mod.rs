//! Roster selection domain
//!
//! Decides which agents examine a request.
//!
//! ```text
//! mandatory ─┐
//! triggered ─┼─> dependency closure ─> ∪ prior turn ─> borderline ─> floor ─> ceiling
//! ```
//!
//! The prior-turn roster is never shrunk: when it alone exceeds the ceiling
//! the returned roster is over-ceiling and says so.

pub mod entities;
pub mod policy;
pub mod selector;

pub use entities::{InclusionReason, Roster};
pub use policy::{DOUBT_THRESHOLD, RosterPolicy};
pub use selector::{RosterSelector, estimated_relevance};
