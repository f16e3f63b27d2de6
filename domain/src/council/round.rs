//! One council round

use super::policy::CouncilPolicy;
use super::review::ReviewerVerdict;
use super::role::ReviewerRole;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouncilRound {
    pub round_number: u32,
    pub reviewer_outputs: BTreeMap<ReviewerRole, ReviewerVerdict>,
    pub quality_score: f64,
}

impl CouncilRound {
    /// Close a round once every reviewer has settled.
    ///
    /// Quality comes from the self-correction reviewer alone (0 when it is
    /// missing or gave no score). Each other role that did not complete
    /// subtracts the policy's timeout penalty. The result stays in `[0, 1]`.
    pub fn score(
        round_number: u32,
        outputs: impl IntoIterator<Item = ReviewerVerdict>,
        policy: &CouncilPolicy,
    ) -> Self {
        let reviewer_outputs: BTreeMap<ReviewerRole, ReviewerVerdict> =
            outputs.into_iter().map(|v| (v.role, v)).collect();

        let base = reviewer_outputs
            .get(&ReviewerRole::SelfCorrection)
            .filter(|v| v.is_completed())
            .and_then(|v| v.score)
            .unwrap_or(0.0);

        let missing = ReviewerRole::ALL
            .iter()
            .filter(|role| !role.produces_quality())
            .filter(|role| !reviewer_outputs.get(*role).is_some_and(|v| v.is_completed()))
            .count();

        let quality = (base - missing as f64 * policy.reviewer_timeout_penalty).clamp(0.0, 1.0);

        Self {
            round_number,
            reviewer_outputs,
            quality_score: quality,
        }
    }

    pub fn completed_reviewers(&self) -> usize {
        self.reviewer_outputs
            .values()
            .filter(|v| v.is_completed())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::council::review::ReviewerReply;

    fn all_completed(quality: f64) -> Vec<ReviewerVerdict> {
        ReviewerRole::ALL
            .iter()
            .map(|&role| {
                let reply = if role.produces_quality() {
                    ReviewerReply::scored(quality)
                } else {
                    ReviewerReply::scored(0.1).with_finding("looks fine")
                };
                ReviewerVerdict::completed(role, reply, 5)
            })
            .collect()
    }

    #[test]
    fn test_quality_comes_from_self_correction() {
        let round = CouncilRound::score(1, all_completed(0.87), &CouncilPolicy::default());
        assert_eq!(round.quality_score, 0.87);
        assert_eq!(round.completed_reviewers(), 6);
    }

    #[test]
    fn test_missing_reviewer_penalty() {
        let mut outputs = all_completed(0.9);
        outputs[0] = ReviewerVerdict::timeout(ReviewerRole::Research, 2000);
        outputs[1] = ReviewerVerdict::error(ReviewerRole::Critique, "exit 1", 3);

        let round = CouncilRound::score(2, outputs, &CouncilPolicy::default());
        assert!((round.quality_score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_absent_role_is_penalized_like_timeout() {
        let outputs: Vec<_> = all_completed(0.9)
            .into_iter()
            .filter(|v| v.role != ReviewerRole::RedFlag)
            .collect();
        let round = CouncilRound::score(1, outputs, &CouncilPolicy::default());
        assert!((round.quality_score - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_missing_self_correction_scores_zero() {
        let mut outputs = all_completed(0.99);
        outputs[5] = ReviewerVerdict::timeout(ReviewerRole::SelfCorrection, 8000);
        let round = CouncilRound::score(1, outputs, &CouncilPolicy::default());
        assert_eq!(round.quality_score, 0.0);
    }

    #[test]
    fn test_out_of_range_score_is_clamped() {
        let round = CouncilRound::score(1, all_completed(1.7), &CouncilPolicy::default());
        assert_eq!(round.quality_score, 1.0);
    }
}
