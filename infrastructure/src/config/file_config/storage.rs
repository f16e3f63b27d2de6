//! Storage and logging locations from TOML (`[storage]`, `[logging]`)
//!
//! ```toml
//! [storage]
//! registry_path = "~/.local/share/agent-council/registry.json"
//! audit_path = "~/.local/share/agent-council/audit.jsonl"
//! context_path = "./CONTEXT.md"
//!
//! [logging]
//! dir = "~/.local/state/agent-council/logs"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "agent-council";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// Weight registry file; defaults to the user data directory
    pub registry_path: Option<PathBuf>,
    /// Audit log file; defaults to the user data directory
    pub audit_path: Option<PathBuf>,
    /// File whose content is forwarded to agents as shared context
    pub context_path: Option<PathBuf>,
}

impl FileStorageConfig {
    pub fn registry_path(&self) -> Option<PathBuf> {
        self.registry_path
            .as_deref()
            .map(expand_home)
            .or_else(|| default_data_file("registry.json"))
    }

    pub fn audit_path(&self) -> Option<PathBuf> {
        self.audit_path
            .as_deref()
            .map(expand_home)
            .or_else(|| default_data_file("audit.jsonl"))
    }

    pub fn context_path(&self) -> Option<PathBuf> {
        self.context_path.as_deref().map(expand_home)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for daily rotated log files; file logging is off when unset
    pub dir: Option<PathBuf>,
}

impl FileLoggingConfig {
    pub fn dir(&self) -> Option<PathBuf> {
        self.dir.as_deref().map(expand_home)
    }
}

fn default_data_file(name: &str) -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join(APP_DIR).join(name))
}

/// Expand a leading `~/` to the home directory.
fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}
