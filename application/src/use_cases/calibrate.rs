//! Calibrate use case
//!
//! Folds finished sessions (and late accuracy feedback) into the shared
//! registry. Runs on a background worker fed by a bounded queue so the
//! request path never waits on calibration.

use crate::registry::{RegistryError, SharedRegistry};
use council_domain::{
    AgentId, CalibrationPolicy, FeedbackSignal, SessionId, SessionOutcome, WeightRegistry,
    feedback_signals,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Work item for the calibration worker.
#[derive(Debug, Clone)]
pub enum CalibrationJob {
    Session(Box<SessionOutcome>),
    /// Accuracy reported after the session was already calibrated
    Feedback {
        session_id: SessionId,
        accuracy: BTreeMap<AgentId, f64>,
    },
}

/// Sending side of the calibration queue.
///
/// Submissions never block: when the queue is full the job is dropped and
/// a warning is logged.
#[derive(Debug, Clone)]
pub struct CalibrationHandle {
    sender: mpsc::Sender<CalibrationJob>,
}

impl CalibrationHandle {
    pub fn submit(&self, outcome: SessionOutcome) -> bool {
        self.enqueue(CalibrationJob::Session(Box::new(outcome)))
    }

    pub fn submit_feedback(&self, session_id: SessionId, accuracy: BTreeMap<AgentId, f64>) -> bool {
        self.enqueue(CalibrationJob::Feedback {
            session_id,
            accuracy,
        })
    }

    fn enqueue(&self, job: CalibrationJob) -> bool {
        match self.sender.try_send(job) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Calibration queue is full, dropping job");
                false
            }
            Err(TrySendError::Closed(_)) => {
                warn!("Calibration worker has stopped, dropping job");
                false
            }
        }
    }
}

/// Use case for updating registry weights from observed performance
pub struct CalibrateUseCase {
    registry: Arc<SharedRegistry>,
    policy: CalibrationPolicy,
}

impl CalibrateUseCase {
    pub fn new(registry: Arc<SharedRegistry>, policy: CalibrationPolicy) -> Self {
        Self { registry, policy }
    }

    /// Apply the signals of one finished session.
    pub async fn apply_outcome(
        &self,
        outcome: &SessionOutcome,
    ) -> Result<Arc<WeightRegistry>, RegistryError> {
        let signals = feedback_signals(outcome, &self.policy);
        debug!(
            session = %outcome.session_id,
            signals = signals.len(),
            "Calibrating from session outcome"
        );
        self.apply(&signals).await
    }

    /// Apply accuracy that arrived after the session was calibrated.
    pub async fn apply_feedback(
        &self,
        session_id: &SessionId,
        accuracy: &BTreeMap<AgentId, f64>,
    ) -> Result<Arc<WeightRegistry>, RegistryError> {
        let signals: Vec<FeedbackSignal> = accuracy
            .iter()
            .map(|(agent, value)| FeedbackSignal::accuracy_only(agent.clone(), *value))
            .collect();
        debug!(session = %session_id, signals = signals.len(), "Calibrating from late feedback");
        self.apply(&signals).await
    }

    async fn apply(&self, signals: &[FeedbackSignal]) -> Result<Arc<WeightRegistry>, RegistryError> {
        let policy = self.policy;
        let updated = self
            .registry
            .update(|current| current.calibrated(signals, &policy))
            .await?;
        info!(version = updated.version(), "Registry calibrated");
        Ok(updated)
    }

    /// Start the background worker.
    ///
    /// The worker drains the queue until every [`CalibrationHandle`] is
    /// dropped, so awaiting the returned handle flushes pending jobs.
    pub fn spawn(self, capacity: usize) -> (CalibrationHandle, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::channel(capacity.max(1));

        let worker = tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                let result = match &job {
                    CalibrationJob::Session(outcome) => self.apply_outcome(outcome).await,
                    CalibrationJob::Feedback {
                        session_id,
                        accuracy,
                    } => self.apply_feedback(session_id, accuracy).await,
                };
                if let Err(e) = result {
                    error!("Calibration failed, registry left unchanged: {}", e);
                }
            }
            debug!("Calibration worker stopped");
        });

        (CalibrationHandle { sender }, worker)
    }
}
