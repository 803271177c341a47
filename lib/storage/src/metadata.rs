use creditx_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Training-time facts shipped with the model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    #[serde(default)]
    pub model_type: Option<String>,
    #[serde(default)]
    pub auc_score: Option<f64>,
    #[serde(default)]
    pub optimal_threshold: Option<f64>,
    /// Business cost at the optimal threshold
    #[serde(default)]
    pub optimal_cost: Option<f64>,
    #[serde(default)]
    pub training_date: Option<String>,
    /// `[[tn, fp], [fn, tp]]`
    #[serde(default)]
    pub confusion_matrix: Option<[[u64; 2]; 2]>,
}

/// `threshold.json` holds either a bare number or `{"threshold": x}`
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum ThresholdFile {
    Bare(f64),
    Wrapped { threshold: f64 },
}

pub(crate) fn read_json<T, P>(path: P, what: &str) -> Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let raw = std::fs::read(path).map_err(|e| {
        Error::SchemaLoad(format!("cannot read {}: {}", path.display(), e))
    })?;
    serde_json::from_slice(&raw).map_err(|e| {
        Error::SchemaLoad(format!("malformed {} in {}: {}", what, path.display(), e))
    })
}

impl ModelMetadata {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        read_json(path, "model metadata")
    }
}

pub fn load_threshold<P: AsRef<Path>>(path: P) -> Result<f64> {
    let file: ThresholdFile = read_json(path, "threshold")?;
    Ok(match file {
        ThresholdFile::Bare(t) => t,
        ThresholdFile::Wrapped { threshold } => threshold,
    })
}
