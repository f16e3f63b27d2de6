//! Request inputs for the turns of one CLI run

use council_application::OrchestrateInput;
use council_domain::{AgentId, CouncilError, Request};
use std::collections::BTreeMap;

/// Builds one input per turn of a session.
///
/// The prior roster and accuracy given on the command line describe what
/// happened before this run, so only the first turn carries them.
pub struct TurnInputs {
    session: String,
    prior_roster: Option<Vec<AgentId>>,
    accuracy: Option<BTreeMap<AgentId, f64>>,
}

impl TurnInputs {
    pub fn new(
        session: String,
        prior_roster: Vec<AgentId>,
        accuracy: impl IntoIterator<Item = (AgentId, f64)>,
    ) -> Self {
        let accuracy: BTreeMap<AgentId, f64> = accuracy.into_iter().collect();
        Self {
            session,
            prior_roster: Some(prior_roster).filter(|r| !r.is_empty()),
            accuracy: Some(accuracy).filter(|a| !a.is_empty()),
        }
    }

    pub fn next(&mut self, text: String) -> Result<OrchestrateInput, CouncilError> {
        let mut request = Request::new(text, self.session.as_str())?;
        if let Some(prior) = self.prior_roster.take() {
            request = request.with_prior_roster(prior);
        }
        let mut input = OrchestrateInput::new(request);
        if let Some(accuracy) = self.accuracy.take() {
            input = input.with_accuracy(accuracy);
        }
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_extras_apply_to_first_turn_only() {
        let mut turns = TurnInputs::new(
            "ops-42".to_string(),
            vec![AgentId::new("security")],
            [(AgentId::new("security"), 0.8)],
        );

        let first = turns.next("rotate the keys".to_string()).unwrap();
        assert_eq!(first.accuracy.len(), 1);
        assert_eq!(
            first.request.prior_roster(),
            Some(&[AgentId::new("security")][..])
        );

        let second = turns.next("now redeploy".to_string()).unwrap();
        assert!(second.accuracy.is_empty());
        assert!(second.request.prior_roster().is_none());
        assert_eq!(second.request.session_id().as_str(), "ops-42");
    }

    #[test]
    fn test_blank_request_is_rejected() {
        let mut turns = TurnInputs::new("s".to_string(), vec![], Vec::<(AgentId, f64)>::new());
        assert!(turns.next("   ".to_string()).is_err());
    }
}
