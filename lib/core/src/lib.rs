//! # creditx Core
//!
//! Core library for the creditx scoring service.
//!
//! This crate holds the deterministic serving-time pipeline around an
//! already-fitted credit-default classifier:
//!
//! - [`FeatureSchema`] - Ordered feature names the model expects
//! - [`CategoricalEncoder`] - Fixed integer codes for categorical inputs
//! - [`FeatureVectorBuilder`] - Sparse record to dense, schema-aligned vector
//! - [`ScorerAdapter`] - Guarded access to an opaque [`Scorer`]
//! - [`DecisionEngine`] - Fixed-threshold accept/reject decision
//! - [`explain::rank`] - Top-K ranking of per-feature attributions
//! - [`ScoringContext`] - The immutable context wiring all of the above
//!
//! ## Example
//!
//! ```rust
//! use creditx_core::{FeatureSchema, PartialClientRecord, Scorer, ScoringContext, InputVariant, Result};
//! use std::sync::Arc;
//!
//! struct Constant;
//!
//! impl Scorer for Constant {
//!     fn predict_probability(&self, _features: &[f64]) -> Result<f64> {
//!         Ok(0.12)
//!     }
//! }
//!
//! let schema = FeatureSchema::from_names(["AMT_CREDIT", "CODE_GENDER"]).unwrap();
//! let ctx = ScoringContext::builder(schema, Arc::new(Constant))
//!     .threshold(0.09)
//!     .build()
//!     .unwrap();
//!
//! let record = PartialClientRecord::new()
//!     .with("AMT_CREDIT", 500000.0)
//!     .with("CODE_GENDER", "F");
//! let scored = ctx.score_record(&record, InputVariant::Demo).unwrap();
//! assert_eq!(scored.result.decision.as_str(), "reject");
//! ```

pub mod builder;
pub mod config;
pub mod decision;
pub mod encoder;
pub mod error;
pub mod explain;
pub mod imputer;
pub mod pipeline;
pub mod record;
pub mod schema;
pub mod scorer;
pub mod vector;

pub use builder::{BuiltVector, CategoricalFallback, FeatureVectorBuilder};
pub use config::ServiceConfig;
pub use decision::{decide, Decision, DecisionEngine, ScoreResult, DEFAULT_THRESHOLD};
pub use encoder::{CategoricalEncoder, CategoricalField, Encoded};
pub use error::{Error, Result};
pub use explain::{AttributionEntry, Direction, DEFAULT_TOP_K};
pub use imputer::{ImputationPolicy, ImputeStrategy, Imputer, InputVariant, StatisticImputer};
pub use pipeline::{
    ClientAnalysis, ContextBuilder, DemoPrediction, PaymentProfile, RiskLevel, Scored,
    ScoringContext,
};
pub use record::{CompleteClientInput, DemoClientInput, FieldValue, PartialClientRecord};
pub use schema::FeatureSchema;
pub use scorer::{Explainer, Scorer, ScorerAdapter};
pub use vector::FeatureVector;
