//! Explainability for credit decisions
//!
//! Ranks per-feature attributions produced by an external [`Explainer`](crate::Explainer)
//! so the caller sees which inputs pushed a decision, and in which direction.

use crate::{Error, Result};
use serde::Serialize;

/// Number of entries kept when the caller does not ask otherwise
pub const DEFAULT_TOP_K: usize = 10;

/// Sign of a feature's effect on the default probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    #[serde(rename = "increases risk")]
    IncreasesRisk,
    #[serde(rename = "decreases risk")]
    DecreasesRisk,
}

impl Direction {
    /// Zero attribution is labelled as decreasing risk
    #[inline]
    pub fn of(attribution: f64) -> Self {
        if attribution > 0.0 {
            Direction::IncreasesRisk
        } else {
            Direction::DecreasesRisk
        }
    }
}

/// One ranked feature with its attribution and the input it was computed on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributionEntry {
    pub feature: String,
    /// Signed attribution value
    pub impact: f64,
    /// Input value of the feature
    pub value: f64,
    pub direction: Direction,
}

/// Pair, rank and truncate attributions
///
/// `feature_names`, `attributions` and `input_values` are aligned by
/// position and must have the same length. Entries are ordered by
/// descending absolute attribution; equal magnitudes keep schema order.
pub fn rank(
    feature_names: &[String],
    attributions: &[f64],
    input_values: &[f64],
    top_k: usize,
) -> Result<Vec<AttributionEntry>> {
    if feature_names.len() != attributions.len() || feature_names.len() != input_values.len() {
        return Err(Error::Alignment {
            features: feature_names.len(),
            attributions: attributions.len(),
            values: input_values.len(),
        });
    }

    if let Some(position) = attributions.iter().position(|a| !a.is_finite()) {
        return Err(Error::Scoring(format!(
            "explainer returned a non-finite attribution for '{}'",
            feature_names[position]
        )));
    }

    let mut order: Vec<usize> = (0..feature_names.len()).collect();
    // sort_by is stable, so ties keep column order
    order.sort_by(|&a, &b| attributions[b].abs().total_cmp(&attributions[a].abs()));
    order.truncate(top_k);

    Ok(order
        .into_iter()
        .map(|i| AttributionEntry {
            feature: feature_names[i].clone(),
            impact: attributions[i],
            value: input_values[i],
            direction: Direction::of(attributions[i]),
        })
        .collect())
}
