//! Output format value object

use serde::{Deserialize, Serialize};

/// How an orchestration outcome is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Roster, per-agent results, council rounds and verdict
    Full,
    /// Verdict and top actions only (default)
    #[default]
    Summary,
    Json,
}
