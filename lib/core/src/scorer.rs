//! Model capabilities
//!
//! The trained classifier and its attribution explainer are opaque to the
//! pipeline. Anything that can turn a feature row into a default
//! probability is a [`Scorer`]; anything that can turn it into per-feature
//! attributions is an [`Explainer`].

use crate::{Error, FeatureVector, Result};
use std::sync::Arc;

/// Probability of the positive ("default") class for one feature row
pub trait Scorer: Send + Sync {
    fn predict_probability(&self, features: &[f64]) -> Result<f64>;
}

/// Signed per-feature contributions for one feature row, in column order
pub trait Explainer: Send + Sync {
    fn explain(&self, features: &[f64]) -> Result<Vec<f64>>;
}

/// Guards a [`Scorer`] with the schema width and output range checks
#[derive(Clone)]
pub struct ScorerAdapter {
    scorer: Arc<dyn Scorer>,
    expected_dim: usize,
}

impl std::fmt::Debug for ScorerAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScorerAdapter")
            .field("expected_dim", &self.expected_dim)
            .finish_non_exhaustive()
    }
}

impl ScorerAdapter {
    pub fn new(scorer: Arc<dyn Scorer>, expected_dim: usize) -> Self {
        Self {
            scorer,
            expected_dim,
        }
    }

    /// Score a vector; failures propagate as [`Error::Scoring`]
    pub fn score(&self, vector: &FeatureVector) -> Result<f64> {
        if vector.dim() != self.expected_dim {
            return Err(Error::Scoring(format!(
                "feature vector has {} columns, model expects {}",
                vector.dim(),
                self.expected_dim
            )));
        }

        let probability = self.scorer.predict_probability(vector.as_slice())?;

        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(Error::Scoring(format!(
                "model returned an invalid probability: {}",
                probability
            )));
        }

        Ok(probability)
    }
}
