//! Upstream imputation stage
//!
//! Fills fields the client did not supply with statistics learned at
//! training time. It runs on the sparse record before the builder, so the
//! builder itself only ever sees zero for what is still missing.

use crate::record::PartialClientRecord;
use crate::{Error, FeatureSchema, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Fills missing values of a partial record in place
pub trait Imputer: Send + Sync {
    fn impute(&self, schema: &FeatureSchema, record: &mut PartialClientRecord);
}

/// Which input variants go through the imputer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImputationPolicy {
    /// Never impute; missing fields stay at zero
    #[default]
    None,
    /// Impute the complete variant and stored clients only
    Complete,
    /// Impute every variant, demo included
    All,
}

/// Input variant a record arrived through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputVariant {
    Demo,
    Complete,
}

impl ImputationPolicy {
    pub fn applies_to(&self, variant: InputVariant) -> bool {
        match self {
            ImputationPolicy::None => false,
            ImputationPolicy::Complete => variant == InputVariant::Complete,
            ImputationPolicy::All => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImputeStrategy {
    Mean,
    Median,
    MostFrequent,
}

/// Per-feature fill values, as persisted next to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticImputer {
    pub strategy: ImputeStrategy,
    pub statistics: BTreeMap<String, f64>,
}

impl StatisticImputer {
    pub fn new(strategy: ImputeStrategy, statistics: BTreeMap<String, f64>) -> Self {
        Self {
            strategy,
            statistics,
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read(path).map_err(|e| {
            Error::SchemaLoad(format!("cannot read {}: {}", path.display(), e))
        })?;
        let imputer: Self = serde_json::from_slice(&raw).map_err(|e| {
            Error::SchemaLoad(format!("malformed imputer in {}: {}", path.display(), e))
        })?;
        if let Some((name, _)) = imputer.statistics.iter().find(|(_, v)| !v.is_finite()) {
            return Err(Error::SchemaLoad(format!(
                "imputer statistic for '{}' is not finite",
                name
            )));
        }
        Ok(imputer)
    }
}

impl Imputer for StatisticImputer {
    fn impute(&self, schema: &FeatureSchema, record: &mut PartialClientRecord) {
        for name in schema.iter() {
            if record.has_value(name) {
                continue;
            }
            if let Some(value) = self.statistics.get(name) {
                record.insert(name, *value);
            }
        }
    }
}
