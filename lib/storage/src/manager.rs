use crate::clients::ClientStore;
use crate::metadata::{load_threshold, ModelMetadata};
use chrono::{DateTime, Utc};
use creditx_core::{
    Error, FeatureSchema, ImputationPolicy, Result, ScoringContext, ServiceConfig,
    StatisticImputer, DEFAULT_THRESHOLD,
};
use creditx_model::ModelSpec;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

pub const FEATURE_COLUMNS_FILE: &str = "feature_columns.json";
pub const MODEL_FILE: &str = "model.json";
pub const THRESHOLD_FILE: &str = "threshold.json";
pub const METADATA_FILE: &str = "metadata.json";
pub const IMPUTER_FILE: &str = "imputer.json";
pub const CLIENTS_FILE: &str = "clients.json";

/// Where the decision threshold came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdSource {
    Override,
    ThresholdFile,
    Metadata,
    Default,
}

/// Everything loaded from the artifact directory, ready to serve
pub struct LoadedArtifacts {
    pub context: Arc<ScoringContext>,
    pub model_type: &'static str,
    pub metadata: ModelMetadata,
    pub clients: Option<Arc<ClientStore>>,
    /// Hex SHA-256 of `model.json`
    pub model_sha256: String,
    pub threshold_source: ThresholdSource,
    pub loaded_at: DateTime<Utc>,
}

/// Loads the artifact directory once at start
pub struct ArtifactManager {
    model_dir: PathBuf,
}

impl ArtifactManager {
    pub fn new<P: AsRef<Path>>(model_dir: P) -> Self {
        Self {
            model_dir: model_dir.as_ref().to_path_buf(),
        }
    }

    fn path(&self, file: &str) -> PathBuf {
        self.model_dir.join(file)
    }

    /// Path of an optional artifact, if it exists
    fn optional(&self, file: &str) -> Option<PathBuf> {
        let path = self.path(file);
        path.exists().then_some(path)
    }

    pub fn load(&self, config: &ServiceConfig) -> Result<LoadedArtifacts> {
        info!("Loading artifacts from {:?}", self.model_dir);

        let schema = FeatureSchema::load(self.path(FEATURE_COLUMNS_FILE))?;
        info!("Feature schema loaded: {} features", schema.len());

        let model_path = self.path(MODEL_FILE);
        let raw_model = std::fs::read(&model_path).map_err(|e| {
            Error::SchemaLoad(format!("cannot read {}: {}", model_path.display(), e))
        })?;
        let model_sha256 = format!("{:x}", Sha256::digest(&raw_model));
        let model = Arc::new(ModelSpec::from_slice(&raw_model)?.bind(&schema)?);
        let model_type = model.model_type();

        let metadata = match self.optional(METADATA_FILE) {
            Some(path) => ModelMetadata::load(path)?,
            None => ModelMetadata::default(),
        };

        let (threshold, threshold_source) = match config.threshold {
            Some(t) => (t, ThresholdSource::Override),
            None => match self.optional(THRESHOLD_FILE) {
                Some(path) => (load_threshold(path)?, ThresholdSource::ThresholdFile),
                None => match metadata.optimal_threshold {
                    Some(t) => (t, ThresholdSource::Metadata),
                    None => (DEFAULT_THRESHOLD, ThresholdSource::Default),
                },
            },
        };
        info!("Decision threshold: {:.3} ({:?})", threshold, threshold_source);

        let mut builder = ScoringContext::builder(schema, model.clone())
            .threshold(threshold)
            .top_k(config.top_k)
            .imputation(config.imputation);

        if model.supports_attribution() {
            builder = builder.explainer(model.clone());
        } else {
            warn!("Model carries no node values, explanations are unavailable");
        }

        match self.optional(IMPUTER_FILE) {
            Some(path) => {
                let imputer = StatisticImputer::load(path)?;
                info!(
                    "Imputer loaded: {} statistics ({:?})",
                    imputer.statistics.len(),
                    imputer.strategy
                );
                builder = builder.imputer(Arc::new(imputer));
            }
            None if config.imputation != ImputationPolicy::None => {
                warn!(
                    "Imputation policy is {:?} but {} is missing; affected requests will fail",
                    config.imputation, IMPUTER_FILE
                );
            }
            None => {}
        }

        let clients = match self.optional(CLIENTS_FILE) {
            Some(path) => {
                let store = ClientStore::load(path)?;
                info!("{} demo clients loaded", store.len());
                Some(Arc::new(store))
            }
            None => None,
        };

        let context = builder.build()?;

        Ok(LoadedArtifacts {
            context: Arc::new(context),
            model_type,
            metadata,
            clients,
            model_sha256,
            threshold_source,
            loaded_at: Utc::now(),
        })
    }
}
