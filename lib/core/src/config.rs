use crate::explain::DEFAULT_TOP_K;
use crate::imputer::ImputationPolicy;
use serde::{Deserialize, Serialize};

/// Serving options resolved from the command line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Overrides any threshold shipped with the model artifacts
    pub threshold: Option<f64>,
    pub top_k: usize,
    pub imputation: ImputationPolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            threshold: None,
            top_k: DEFAULT_TOP_K,
            imputation: ImputationPolicy::None,
        }
    }
}
