//! Registry update from feedback signals

use super::feedback::FeedbackSignal;
use super::policy::{CalibrationPolicy, ema};
use crate::registry::WeightRegistry;

impl WeightRegistry {
    /// Return a new registry with `signals` applied and weights renormalized.
    ///
    /// Signals for unknown agents are skipped. The returned snapshot carries
    /// the next version number; `self` is left untouched so readers holding
    /// it never observe a partial update.
    pub fn calibrated(&self, signals: &[FeedbackSignal], policy: &CalibrationPolicy) -> WeightRegistry {
        let decay = policy.ema_decay;
        let mut next = self.clone();

        for signal in signals {
            let Some(entry) = next.entry_mut(&signal.agent_id) else {
                continue;
            };
            if let Some(value) = signal.signal() {
                entry.spec.base_weight = ema(entry.spec.base_weight, value, decay);
            }
            if let Some(contribution) = signal.contribution {
                entry.contribution_ema = ema(entry.contribution_ema, contribution, decay);
                entry.sessions += 1;
            }
            if let Some(accuracy) = signal.accuracy {
                entry.accuracy_ema = ema(entry.accuracy_ema, accuracy, decay);
            }
        }

        let version = self.version() + 1;
        next.renormalized().with_version(version)
    }
}
