//! Council state machine

use super::policy::CouncilPolicy;
use super::round::CouncilRound;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CouncilState {
    Running { round: u32 },
    Passed,
    Exhausted,
}

impl CouncilState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CouncilState::Running { .. })
    }
}

/// Verdict returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinalVerdict {
    Pass,
    Conditional,
    Fail,
}

impl FinalVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinalVerdict::Pass => "PASS",
            FinalVerdict::Conditional => "CONDITIONAL",
            FinalVerdict::Fail => "FAIL",
        }
    }
}

impl std::fmt::Display for FinalVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sequence of council rounds for one request (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouncilSession {
    pub rounds: Vec<CouncilRound>,
    pub state: CouncilState,
    /// The session deadline closed the loop early
    #[serde(default)]
    pub deadline_exceeded: bool,
    /// No agent succeeded, so no review took place
    #[serde(default)]
    pub skipped: bool,
}

impl Default for CouncilSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CouncilSession {
    pub fn new() -> Self {
        Self {
            rounds: Vec::new(),
            state: CouncilState::Running { round: 1 },
            deadline_exceeded: false,
            skipped: false,
        }
    }

    /// A council that never ran.
    pub fn skipped() -> Self {
        Self {
            rounds: Vec::new(),
            state: CouncilState::Exhausted,
            deadline_exceeded: false,
            skipped: true,
        }
    }

    /// Round currently expected, if the loop is still running.
    pub fn current_round(&self) -> Option<u32> {
        match self.state {
            CouncilState::Running { round } => Some(round),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Apply one settled round and advance the state machine.
    ///
    /// Rounds recorded after the loop terminated are ignored. The loop
    /// reaches a terminal state after at most `policy.max_rounds` rounds.
    pub fn record_round(&mut self, round: CouncilRound, policy: &CouncilPolicy) -> CouncilState {
        let Some(current) = self.current_round() else {
            return self.state;
        };

        let quality = round.quality_score;
        self.rounds.push(round);

        self.state = if quality >= policy.pass_threshold {
            CouncilState::Passed
        } else if current >= policy.max_rounds.max(1) {
            CouncilState::Exhausted
        } else {
            CouncilState::Running { round: current + 1 }
        };
        self.state
    }

    /// Terminate because the session deadline expired.
    ///
    /// `partial` is the in-flight round with its unsettled reviewers already
    /// marked as timed out.
    pub fn close_on_deadline(&mut self, partial: Option<CouncilRound>) {
        if self.is_terminal() {
            return;
        }
        if let Some(round) = partial {
            self.rounds.push(round);
        }
        self.state = CouncilState::Exhausted;
        self.deadline_exceeded = true;
    }

    pub fn final_quality(&self) -> Option<f64> {
        self.rounds.last().map(|r| r.quality_score)
    }

    /// Map the terminal state to a verdict.
    ///
    /// A session that has not terminated is judged like an exhausted one.
    pub fn verdict(&self, policy: &CouncilPolicy) -> FinalVerdict {
        if self.state == CouncilState::Passed {
            return FinalVerdict::Pass;
        }
        match self.final_quality() {
            Some(q) if !self.skipped && q >= policy.conditional_threshold => {
                FinalVerdict::Conditional
            }
            _ => FinalVerdict::Fail,
        }
    }
}
