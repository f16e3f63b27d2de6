//! Weight calibration
//!
//! After a session completes, every participating agent receives a feedback
//! signal in `[0, 1]` and its base weight is smoothed towards it:
//!
//! ```text
//! new_weight = old_weight × decay + signal × (1 − decay)
//! ```
//!
//! The whole registry is then renormalized, so agents that did not take part
//! shift proportionally.

pub mod feedback;
pub mod policy;
pub mod update;

pub use feedback::{FeedbackSignal, SessionOutcome, feedback_signals, retain_participants};
pub use policy::{CalibrationPolicy, ema};
