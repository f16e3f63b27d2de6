//! Error types for subprocess calls

use council_application::GatewayError;
use thiserror::Error;

/// Errors that can occur when talking to an agent or reviewer subprocess
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("No command configured for {0}")]
    NoCommand(String),

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{program} exited with {status}: {stderr}")]
    ExitStatus {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("Failed to parse reply: {error}\nRaw reply: {raw}")]
    Parse { error: String, raw: String },
}

impl From<ProcessError> for GatewayError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::NoCommand(_) | ProcessError::Spawn { .. } => {
                GatewayError::Unavailable(err.to_string())
            }
            ProcessError::ExitStatus { .. } => GatewayError::RequestFailed(err.to_string()),
            ProcessError::Parse { .. } => GatewayError::InvalidReply(err.to_string()),
            ProcessError::Io(_) | ProcessError::Serialization(_) => {
                GatewayError::Other(err.to_string())
            }
        }
    }
}
