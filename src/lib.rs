//! # creditx
//!
//! Serving-time scoring for a pre-trained credit-default classifier.
//!
//! creditx turns a sparse, partially filled client record into the dense
//! feature vector the model was trained on, asks the model for a default
//! probability, applies a fixed threshold to reach an accept/reject
//! decision, and ranks per-feature attributions to explain it.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! creditx --model-dir ./models --http-port 8000
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use creditx::prelude::*;
//!
//! let loaded = ArtifactManager::new("./models")
//!     .load(&ServiceConfig::default())
//!     .unwrap();
//!
//! let prediction = loaded.context.score_demo(&DemoClientInput::default()).unwrap();
//! println!(
//!     "p = {:.4}, decision = {}",
//!     prediction.scored.result.probability,
//!     prediction.scored.result.decision
//! );
//! ```
//!
//! ## Crate Structure
//!
//! - `creditx-core` - Schema, encoder, vector builder, decision engine, ranking, scoring context
//! - `creditx-model` - Logistic and tree-ensemble scorers read from `model.json`
//! - `creditx-storage` - Artifact directory loading and stored demo clients
//! - `creditx-api` - REST API

pub use creditx_core::{
    AttributionEntry, CategoricalEncoder, CompleteClientInput, Decision, DecisionEngine,
    DemoClientInput, Error, Explainer, FeatureSchema, FeatureVector, FeatureVectorBuilder,
    ImputationPolicy, InputVariant, PartialClientRecord, Result, ScoreResult, Scorer,
    ScoringContext, ServiceConfig,
};

pub use creditx_model::{BoundModel, LogisticModel, ModelSpec, TreeEnsemble};

pub use creditx_storage::{ArtifactManager, ClientStore, LoadedArtifacts};

pub use creditx_api::{RestApi, ServiceState};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ArtifactManager, AttributionEntry, CompleteClientInput, Decision, DemoClientInput, Error,
        FeatureSchema, InputVariant, PartialClientRecord, Result, ScoringContext, ServiceConfig,
    };
}

/// Ranking of attributions outside a scoring context
pub mod explain {
    pub use creditx_core::explain::rank;
}
