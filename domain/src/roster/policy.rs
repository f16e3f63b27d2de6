//! Roster size policy

use serde::{Deserialize, Serialize};

/// Estimated relevance above which a borderline agent is included
/// ("doubt = include").
pub const DOUBT_THRESHOLD: f64 = 0.30;

/// Minimum and maximum roster size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterPolicy {
    pub min_size: usize,
    pub max_size: usize,
}

impl Default for RosterPolicy {
    fn default() -> Self {
        Self {
            min_size: 4,
            max_size: 12,
        }
    }
}

impl RosterPolicy {
    pub fn new(min_size: usize, max_size: usize) -> Self {
        Self { min_size, max_size }
    }
}
