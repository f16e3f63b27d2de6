//! Quorum floor for agent dispatch
//!
//! Decides whether enough of a roster answered successfully for synthesis to
//! run in normal (non-degraded) mode.

use serde::{Deserialize, Serialize};

/// Slack applied when comparing the success ratio against the floor.
const RATIO_EPSILON: f64 = 1e-9;

/// Minimum fraction of the roster that must respond successfully.
///
/// Always in `(0, 1]`.
///
/// # Example
///
/// ```
/// use council_domain::quorum::QuorumFloor;
///
/// let floor = QuorumFloor::default(); // 80%
/// assert!(floor.is_satisfied(5, 6));  // 83%
/// assert!(!floor.is_satisfied(3, 4)); // 75%
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct QuorumFloor(f64);

impl Default for QuorumFloor {
    fn default() -> Self {
        Self(0.8)
    }
}

impl QuorumFloor {
    /// Create a floor, rejecting values outside `(0, 1]`.
    pub fn new(fraction: f64) -> Result<Self, String> {
        if fraction.is_finite() && fraction > 0.0 && fraction <= 1.0 {
            Ok(Self(fraction))
        } else {
            Err(format!("quorum floor must be in (0, 1], got {}", fraction))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Check the floor for `successes` out of `total` dispatched agents.
    ///
    /// An empty roster never satisfies the floor.
    pub fn is_satisfied(&self, successes: usize, total: usize) -> bool {
        if total == 0 {
            return false;
        }
        successes as f64 / total as f64 >= self.0 - RATIO_EPSILON
    }

    /// Minimum number of successes needed out of `total`.
    pub fn min_successes(&self, total: usize) -> usize {
        ((total as f64 * self.0) - RATIO_EPSILON).ceil().max(0.0) as usize
    }

    pub fn description(&self) -> String {
        format!("at least {:.0}% of the roster", self.0 * 100.0)
    }
}

impl TryFrom<f64> for QuorumFloor {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<QuorumFloor> for f64 {
    fn from(floor: QuorumFloor) -> Self {
        floor.0
    }
}

impl std::fmt::Display for QuorumFloor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::str::FromStr for QuorumFloor {
    type Err = String;

    /// Accepts a fraction (`0.8`) or a percentage (`80%`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let fraction = match s.strip_suffix('%') {
            Some(pct) => {
                pct.trim()
                    .parse::<f64>()
                    .map_err(|_| format!("Invalid percentage: {}", s))?
                    / 100.0
            }
            None => s
                .parse::<f64>()
                .map_err(|_| format!("Invalid quorum floor: {}. Valid: 0.8 or 80%", s))?,
        };
        Self::new(fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_d_five_of_six() {
        let floor = QuorumFloor::default();
        assert!(floor.is_satisfied(5, 6));
        assert!(!floor.is_satisfied(4, 6));
    }

    #[test]
    fn test_exact_boundary() {
        let floor = QuorumFloor::default();
        // 4/5 = 0.8 exactly
        assert!(floor.is_satisfied(4, 5));
        assert!(!floor.is_satisfied(3, 5));
    }

    #[test]
    fn test_zero_total() {
        assert!(!QuorumFloor::default().is_satisfied(0, 0));
        assert!(!QuorumFloor::new(1.0).unwrap().is_satisfied(0, 0));
    }

    #[test]
    fn test_min_successes() {
        let floor = QuorumFloor::default();
        assert_eq!(floor.min_successes(6), 5);
        assert_eq!(floor.min_successes(5), 4);
        assert_eq!(floor.min_successes(4), 4);
        assert_eq!(QuorumFloor::new(0.5).unwrap().min_successes(4), 2);
    }

    #[test]
    fn test_range_validation() {
        assert!(QuorumFloor::new(0.0).is_err());
        assert!(QuorumFloor::new(1.01).is_err());
        assert!(QuorumFloor::new(f64::NAN).is_err());
        assert!(QuorumFloor::new(1.0).is_ok());
    }

    #[test]
    fn test_parse_floor() {
        assert_eq!("0.75".parse::<QuorumFloor>().unwrap().value(), 0.75);
        assert_eq!("80%".parse::<QuorumFloor>().unwrap().value(), 0.8);
        assert!("120%".parse::<QuorumFloor>().is_err());
        assert!("most".parse::<QuorumFloor>().is_err());
    }

    #[test]
    fn test_serde_rejects_out_of_range() {
        let floor: QuorumFloor = serde_json::from_str("0.9").unwrap();
        assert_eq!(floor.value(), 0.9);
        assert!(serde_json::from_str::<QuorumFloor>("0").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(QuorumFloor::default().to_string(), "at least 80% of the roster");
    }
}
