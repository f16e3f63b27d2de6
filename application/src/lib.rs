//! Application layer for agent-council
//!
//! This crate contains use cases, port definitions, the shared registry
//! handle and application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod registry;
pub mod session_cache;
pub mod use_cases;

// Re-export commonly used types
pub use config::{ConfigError, ExecutionParams, OrchestratorConfig};
pub use ports::{
    agent_gateway::{AgentGateway, GatewayError},
    audit_log::{AuditLog, InMemoryAuditLog, NoAuditLog},
    context_provider::{ContextError, ContextProvider, NoContext},
    progress::{NoProgress, ProgressNotifier},
    registry_store::{InMemoryRegistryStore, RegistryStore, StoreError},
    reviewer_gateway::ReviewerGateway,
};
pub use registry::{RegistryError, SharedRegistry};
pub use session_cache::{PriorTurn, SessionRosterCache};
pub use use_cases::calibrate::{CalibrateUseCase, CalibrationHandle, CalibrationJob};
pub use use_cases::execute_agents::{AgentExecutor, DispatchOutcome};
pub use use_cases::load_registry::{LoadRegistryError, LoadRegistryUseCase, LoadedRegistry};
pub use use_cases::orchestrate::{OrchestrateError, OrchestrateInput, OrchestrateUseCase};
pub use use_cases::run_council::CouncilRunner;
