//! Domain layer for agent-council
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns and
//! performs no I/O.
//!
//! # Core Concepts
//!
//! ## Routing
//!
//! A request is routed to a [`Roster`] of specialized agents chosen by the
//! [`RosterSelector`] from the [`WeightRegistry`]: mandatory agents, agents
//! whose trigger keywords appear in the request, their dependencies, and
//! every agent from the previous turn of the same session.
//!
//! ## Consensus
//!
//! Successful [`AgentResult`]s are combined by [`synthesize`] into weighted,
//! ranked actions. A fixed council of reviewers then scores the synthesis
//! over bounded rounds ([`CouncilSession`]) and produces a [`FinalVerdict`].
//!
//! ## Calibration
//!
//! Session outcomes feed [`FeedbackSignal`]s back into the registry through
//! exponential smoothing followed by renormalization.

pub mod agent;
pub mod audit;
pub mod calibration;
pub mod config;
pub mod core;
pub mod council;
pub mod orchestration;
pub mod quorum;
pub mod registry;
pub mod roster;
pub mod synthesis;

// Re-export commonly used types
pub use agent::{ActionId, AgentId, AgentReply, AgentResult, AgentSpec, AgentStatus};
pub use audit::{AuditEntry, session_participants};
pub use calibration::{
    CalibrationPolicy, FeedbackSignal, SessionOutcome, feedback_signals, retain_participants,
};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use core::{
    context::ContextSnapshot,
    error::CouncilError,
    request::{Request, SessionId},
};
pub use council::{
    CouncilPolicy, CouncilRound, CouncilSession, CouncilState, FinalVerdict, ReviewRequest,
    ReviewStatus, ReviewerReply, ReviewerRole, ReviewerVerdict,
};
pub use orchestration::{OrchestrationOutcome, Phase};
pub use quorum::{QuorumFloor, QuorumStatus};
pub use registry::{INITIAL_EMA, Reconciliation, RegistryEntry, WEIGHT_TOLERANCE, WeightRegistry};
pub use roster::{InclusionReason, Roster, RosterPolicy, RosterSelector};
pub use synthesis::{RankedAction, SynthesisReport, synthesize};
