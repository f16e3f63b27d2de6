//! Reviewer roles

use serde::{Deserialize, Serialize};

/// Fixed reviewer sub-roster of the council.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewerRole {
    Research,
    Critique,
    Consensus,
    ProsCons,
    RedFlag,
    /// Sole producer of the round's quality score
    SelfCorrection,
}

impl ReviewerRole {
    pub const ALL: [ReviewerRole; 6] = [
        ReviewerRole::Research,
        ReviewerRole::Critique,
        ReviewerRole::Consensus,
        ReviewerRole::ProsCons,
        ReviewerRole::RedFlag,
        ReviewerRole::SelfCorrection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewerRole::Research => "research",
            ReviewerRole::Critique => "critique",
            ReviewerRole::Consensus => "consensus",
            ReviewerRole::ProsCons => "pros_cons",
            ReviewerRole::RedFlag => "red_flag",
            ReviewerRole::SelfCorrection => "self_correction",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ReviewerRole::Research => "Research",
            ReviewerRole::Critique => "Critique",
            ReviewerRole::Consensus => "Consensus",
            ReviewerRole::ProsCons => "Pros/Cons",
            ReviewerRole::RedFlag => "Red Flag",
            ReviewerRole::SelfCorrection => "Self-Correction",
        }
    }

    pub fn produces_quality(&self) -> bool {
        matches!(self, ReviewerRole::SelfCorrection)
    }
}

impl std::fmt::Display for ReviewerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for ReviewerRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['-', ' ', '/'], "_");
        ReviewerRole::ALL
            .into_iter()
            .find(|role| role.as_str() == key || role.as_str().replace('_', "") == key)
            .ok_or_else(|| {
                format!(
                    "Unknown reviewer role: {}. Valid: research, critique, consensus, pros_cons, red_flag, self_correction",
                    s
                )
            })
    }
}
