//! Threshold decision
//!
//! A probability at or above the threshold is a predicted default and the
//! application is rejected. The tie goes to reject.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Threshold used when no artifact or override provides one
pub const DEFAULT_THRESHOLD: f64 = 0.09;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Accept => "accept",
            Decision::Reject => "reject",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreResult {
    pub probability: f64,
    pub decision: Decision,
    /// `max(p, 1 - p)`, always within [0.5, 1.0]
    pub confidence: f64,
}

/// Apply `threshold` to `probability`
#[inline]
pub fn decide(probability: f64, threshold: f64) -> ScoreResult {
    let decision = if probability >= threshold {
        Decision::Reject
    } else {
        Decision::Accept
    };
    ScoreResult {
        probability,
        decision,
        confidence: probability.max(1.0 - probability),
    }
}

/// Holds the process-wide threshold fixed at load time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionEngine {
    threshold: f64,
}

impl DecisionEngine {
    pub fn new(threshold: f64) -> Result<Self> {
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(Error::InvalidConfig(format!(
                "threshold must be within [0, 1], got {}",
                threshold
            )));
        }
        Ok(Self { threshold })
    }

    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    #[inline]
    pub fn decide(&self, probability: f64) -> ScoreResult {
        decide(probability, self.threshold)
    }
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_tie_rejects() {
        for t in [0.0, 0.09, 0.5, 0.87, 1.0] {
            assert_eq!(decide(t, t).decision, Decision::Reject, "threshold {}", t);
        }
    }

    #[test]
    fn test_threshold_logic() {
        let engine = DecisionEngine::new(0.09).unwrap();
        let decisions: Vec<Decision> = [0.05, 0.08, 0.09, 0.12]
            .iter()
            .map(|p| engine.decide(*p).decision)
            .collect();
        assert_eq!(
            decisions,
            vec![Decision::Accept, Decision::Accept, Decision::Reject, Decision::Reject]
        );
    }

    #[test]
    fn test_confidence_bounds() {
        let mut p = 0.0;
        while p <= 1.0 {
            let result = decide(p, 0.3);
            assert_eq!(result.confidence, p.max(1.0 - p));
            assert!((0.5..=1.0).contains(&result.confidence));
            p += 0.01;
        }
    }

    #[test]
    fn test_invalid_threshold() {
        assert!(matches!(DecisionEngine::new(1.5), Err(Error::InvalidConfig(_))));
        assert!(matches!(DecisionEngine::new(f64::NAN), Err(Error::InvalidConfig(_))));
        assert_eq!(DecisionEngine::default().threshold(), DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_decision_serialization() {
        let json = serde_json::to_string(&decide(0.2, 0.09)).unwrap();
        assert!(json.contains("\"decision\":\"reject\""));
    }
}
