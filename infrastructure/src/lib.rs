//! Infrastructure layer for agent-council
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: configuration loading, the registry file store, the
//! audit log, subprocess gateways and the context provider.

pub mod audit;
pub mod config;
pub mod context;
pub mod gateway;
pub mod store;

// Re-export commonly used types
pub use audit::JsonlAuditLog;
pub use config::{
    ConfigLoader, ConfigSource, ConfigValidationError, FileAgentConfig, FileConfig,
    FileOutputConfig, FileOutputFormat, ResolvedConfig,
};
pub use context::FileContextProvider;
pub use gateway::{ProcessError, ProcessGateway};
pub use store::JsonFileRegistryStore;
