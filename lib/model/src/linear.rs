//! Logistic regression scorer
//!
//! `p = sigmoid(intercept + sum(w_i * x_i))`. Its attributions are the exact
//! log-odds contributions `w_i * (x_i - baseline_i)`.

use creditx_core::{Error, Explainer, FeatureSchema, Result, Scorer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Persisted form: coefficients keyed by feature name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticSpec {
    pub intercept: f64,
    pub coefficients: BTreeMap<String, f64>,
    /// Reference input for attributions, usually the training mean
    #[serde(default)]
    pub baseline: BTreeMap<String, f64>,
}

/// Logistic model bound to schema columns
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticModel {
    intercept: f64,
    weights: Vec<f64>,
    baseline: Vec<f64>,
}

/// Overflow-free logistic function
#[inline]
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn bind_named(
    schema: &FeatureSchema,
    named: &BTreeMap<String, f64>,
    what: &str,
) -> Result<Vec<f64>> {
    let mut dense = vec![0.0; schema.len()];
    for (name, value) in named {
        let position = schema.position(name).ok_or_else(|| {
            Error::SchemaLoad(format!("{} references unknown feature '{}'", what, name))
        })?;
        if !value.is_finite() {
            return Err(Error::SchemaLoad(format!(
                "{} for '{}' is not finite",
                what, name
            )));
        }
        dense[position] = *value;
    }
    Ok(dense)
}

impl LogisticSpec {
    pub fn bind(&self, schema: &FeatureSchema) -> Result<LogisticModel> {
        if !self.intercept.is_finite() {
            return Err(Error::SchemaLoad("logistic intercept is not finite".to_string()));
        }
        Ok(LogisticModel {
            intercept: self.intercept,
            weights: bind_named(schema, &self.coefficients, "coefficient")?,
            baseline: bind_named(schema, &self.baseline, "baseline")?,
        })
    }
}

impl LogisticModel {
    pub fn new(intercept: f64, weights: Vec<f64>) -> Self {
        let baseline = vec![0.0; weights.len()];
        Self {
            intercept,
            weights,
            baseline,
        }
    }

    pub fn dim(&self) -> usize {
        self.weights.len()
    }

    fn check_width(&self, features: &[f64]) -> Result<()> {
        if features.len() == self.weights.len() {
            Ok(())
        } else {
            Err(Error::Scoring(format!(
                "logistic model has {} weights, row has {} columns",
                self.weights.len(),
                features.len()
            )))
        }
    }

    /// Raw log-odds
    pub fn margin(&self, features: &[f64]) -> Result<f64> {
        self.check_width(features)?;
        let z = self.intercept
            + self
                .weights
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>();
        if z.is_finite() {
            Ok(z)
        } else {
            Err(Error::Scoring(format!("logistic margin is not finite: {}", z)))
        }
    }
}

impl Scorer for LogisticModel {
    fn predict_probability(&self, features: &[f64]) -> Result<f64> {
        self.margin(features).map(sigmoid)
    }
}

impl Explainer for LogisticModel {
    fn explain(&self, features: &[f64]) -> Result<Vec<f64>> {
        self.check_width(features)?;
        Ok(self
            .weights
            .iter()
            .zip(&self.baseline)
            .zip(features)
            .map(|((w, b), x)| w * (x - b))
            .collect())
    }
}
