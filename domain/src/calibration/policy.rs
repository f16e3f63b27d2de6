//! Calibration parameters

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPolicy {
    /// Weight kept from the previous value, in `[0, 1)`
    pub ema_decay: f64,
    /// How many top-ranked actions count as "landed" for contribution
    pub top_k: usize,
}

impl Default for CalibrationPolicy {
    fn default() -> Self {
        Self {
            ema_decay: 0.9,
            top_k: 3,
        }
    }
}

impl CalibrationPolicy {
    pub fn with_decay(mut self, ema_decay: f64) -> Self {
        self.ema_decay = ema_decay;
        self
    }
}

/// Exponential moving average step.
pub fn ema(old: f64, signal: f64, decay: f64) -> f64 {
    old * decay + signal * (1.0 - decay)
}
