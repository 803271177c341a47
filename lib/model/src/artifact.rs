//! Persisted model artifact
//!
//! `model.json` is tagged by `"type"` and bound to the feature schema once
//! at load, so per-request scoring never touches feature names.

use crate::forest::{TreeEnsemble, TreeEnsembleSpec};
use crate::linear::{LogisticModel, LogisticSpec};
use creditx_core::{Error, Explainer, FeatureSchema, Result, Scorer};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelSpec {
    Logistic(LogisticSpec),
    TreeEnsemble(TreeEnsembleSpec),
}

impl ModelSpec {
    pub fn from_slice(raw: &[u8]) -> Result<Self> {
        serde_json::from_slice(raw)
            .map_err(|e| Error::SchemaLoad(format!("malformed model artifact: {}", e)))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read(path).map_err(|e| {
            Error::SchemaLoad(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_slice(&raw)
    }

    /// Resolve feature names to schema columns
    pub fn bind(&self, schema: &FeatureSchema) -> Result<BoundModel> {
        let model = match self {
            ModelSpec::Logistic(spec) => {
                let model = spec.bind(schema)?;
                debug!(weights = model.dim(), "Logistic coefficients bound");
                BoundModel::Logistic(model)
            }
            ModelSpec::TreeEnsemble(spec) => {
                let model = spec.bind(schema)?;
                debug!(trees = model.num_trees(), "Tree ensemble bound");
                BoundModel::TreeEnsemble(model)
            }
        };
        info!(
            model_type = model.model_type(),
            features = schema.len(),
            explainable = model.supports_attribution(),
            "Model bound to feature schema"
        );
        Ok(model)
    }
}

/// A loaded model, usable as both scorer and explainer
#[derive(Debug, Clone, PartialEq)]
pub enum BoundModel {
    Logistic(LogisticModel),
    TreeEnsemble(TreeEnsemble),
}

impl BoundModel {
    pub fn model_type(&self) -> &'static str {
        match self {
            BoundModel::Logistic(_) => "logistic",
            BoundModel::TreeEnsemble(_) => "tree_ensemble",
        }
    }

    pub fn supports_attribution(&self) -> bool {
        match self {
            BoundModel::Logistic(_) => true,
            BoundModel::TreeEnsemble(forest) => forest.supports_attribution(),
        }
    }
}

impl Scorer for BoundModel {
    fn predict_probability(&self, features: &[f64]) -> Result<f64> {
        match self {
            BoundModel::Logistic(model) => model.predict_probability(features),
            BoundModel::TreeEnsemble(model) => model.predict_probability(features),
        }
    }
}

impl Explainer for BoundModel {
    fn explain(&self, features: &[f64]) -> Result<Vec<f64>> {
        match self {
            BoundModel::Logistic(model) => model.explain(features),
            BoundModel::TreeEnsemble(model) => model.explain(features),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_logistic() {
        let spec = ModelSpec::from_slice(
            br#"{"type": "logistic", "intercept": 0.0, "coefficients": {"A": 1.0}}"#,
        )
        .unwrap();
        assert!(matches!(spec, ModelSpec::Logistic(_)));

        let schema = FeatureSchema::from_names(["A", "B"]).unwrap();
        let model = spec.bind(&schema).unwrap();
        assert_eq!(model.model_type(), "logistic");
        assert!(model.supports_attribution());
        assert_eq!(model.predict_probability(&[0.0, 3.0]).unwrap(), 0.5);
        // one weight per schema column, unlisted features at zero
        assert!(matches!(&model, BoundModel::Logistic(m) if m.dim() == 2));
    }

    #[test]
    fn test_tagged_tree_ensemble() {
        let spec = ModelSpec::from_slice(
            br#"{"type": "tree_ensemble", "base_score": 0.0, "trees": [{"nodes": [{"leaf": 0.0}]}]}"#,
        )
        .unwrap();
        let schema = FeatureSchema::from_names(["A"]).unwrap();
        let model = spec.bind(&schema).unwrap();
        assert_eq!(model.model_type(), "tree_ensemble");
        assert_eq!(model.predict_probability(&[1.0]).unwrap(), 0.5);
        assert!(matches!(&model, BoundModel::TreeEnsemble(e) if e.num_trees() == 1));
    }

    #[test]
    fn test_unknown_type() {
        let result = ModelSpec::from_slice(br#"{"type": "neural_net"}"#);
        assert!(matches!(result, Err(Error::SchemaLoad(_))));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ModelSpec::load(dir.path().join("model.json"));
        assert!(matches!(result, Err(Error::SchemaLoad(_))));
    }
}
