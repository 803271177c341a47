//! Scoring context
//!
//! The immutable object every request goes through. It owns the loaded
//! schema and model capabilities and wires the pipeline stages together:
//!
//! ```text
//! record -> [imputer] -> builder -> scorer adapter -> decision engine
//!                           \
//!                            -> explainer -> ranker
//! ```
//!
//! Nothing in here mutates after construction, so one context behind an
//! `Arc` serves all workers without locking.

use crate::builder::{CategoricalFallback, FeatureVectorBuilder};
use crate::decision::{DecisionEngine, ScoreResult};
use crate::encoder::CategoricalEncoder;
use crate::explain::{self, AttributionEntry, DEFAULT_TOP_K};
use crate::imputer::{ImputationPolicy, Imputer, InputVariant};
use crate::record::{CompleteClientInput, DemoClientInput, PartialClientRecord};
use crate::scorer::{Explainer, Scorer, ScorerAdapter};
use crate::{Error, FeatureSchema, FeatureVector, Result};
use serde::Serialize;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of scoring one record
#[derive(Debug, Clone, PartialEq)]
pub struct Scored {
    pub vector: FeatureVector,
    pub result: ScoreResult,
    pub fallbacks: Vec<CategoricalFallback>,
}

impl Scored {
    /// Columns carrying a non-zero value
    pub fn features_used(&self) -> usize {
        self.vector.non_zero_count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_probability(probability: f64) -> Self {
        if probability > 0.7 {
            RiskLevel::High
        } else if probability > 0.3 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProfile {
    Excellent,
    Good,
    Watch,
}

impl PaymentProfile {
    pub fn from_payment_ratio(ratio: f64) -> Self {
        if ratio >= 0.95 {
            PaymentProfile::Excellent
        } else if ratio >= 0.8 {
            PaymentProfile::Good
        } else {
            PaymentProfile::Watch
        }
    }
}

/// Display-only figures derived from the echoed input, never from the model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientAnalysis {
    pub age_years: u64,
    pub credit_goods_ratio: f64,
    pub credit_goods_ratio_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_profile: Option<PaymentProfile>,
}

impl ClientAnalysis {
    pub fn from_demo(input: &DemoClientInput) -> Self {
        let credit_goods_ratio = input.amt_credit / input.amt_goods_price;
        Self {
            age_years: input.days_birth.unsigned_abs() / 365,
            credit_goods_ratio,
            credit_goods_ratio_label: format!("{:.1}%", credit_goods_ratio * 100.0),
            payment_profile: input
                .inst_payment_perc_mean
                .map(PaymentProfile::from_payment_ratio),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemoPrediction {
    pub scored: Scored,
    pub risk_level: RiskLevel,
    pub analysis: ClientAnalysis,
}

/// Explicitly constructed, read-only pipeline context
pub struct ScoringContext {
    schema: Arc<FeatureSchema>,
    builder: FeatureVectorBuilder,
    scorer: ScorerAdapter,
    explainer: Option<Arc<dyn Explainer>>,
    imputer: Option<Arc<dyn Imputer>>,
    engine: DecisionEngine,
    top_k: usize,
    imputation: ImputationPolicy,
}

impl std::fmt::Debug for ScoringContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringContext")
            .field("features", &self.schema.len())
            .field("threshold", &self.engine.threshold())
            .field("explainer", &self.explainer.is_some())
            .field("imputer", &self.imputer.is_some())
            .field("top_k", &self.top_k)
            .field("imputation", &self.imputation)
            .finish()
    }
}

impl ScoringContext {
    pub fn builder(schema: FeatureSchema, scorer: Arc<dyn Scorer>) -> ContextBuilder {
        ContextBuilder::new(schema, scorer)
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn threshold(&self) -> f64 {
        self.engine.threshold()
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn imputation(&self) -> ImputationPolicy {
        self.imputation
    }

    pub fn has_explainer(&self) -> bool {
        self.explainer.is_some()
    }

    pub fn has_imputer(&self) -> bool {
        self.imputer.is_some()
    }

    /// Validate, optionally impute, then build the schema-aligned vector
    fn assemble(
        &self,
        record: &PartialClientRecord,
        variant: InputVariant,
    ) -> Result<(FeatureVector, Vec<CategoricalFallback>)> {
        record.validate()?;

        let record = if self.imputation.applies_to(variant) {
            let imputer = self.imputer.as_ref().ok_or_else(|| {
                Error::Unavailable("imputation is enabled but no imputer is loaded".to_string())
            })?;
            let mut owned = record.clone();
            imputer.impute(&self.schema, &mut owned);
            Cow::Owned(owned)
        } else {
            Cow::Borrowed(record)
        };

        let built = self.builder.build(&self.schema, &record);
        for fallback in &built.fallbacks {
            warn!(
                field = %fallback.field,
                raw = %fallback.raw,
                code = fallback.code,
                "Unrecognised categorical value, using fallback code"
            );
        }
        Ok((built.vector, built.fallbacks))
    }

    /// Score a generic partial record
    pub fn score_record(&self, record: &PartialClientRecord, variant: InputVariant) -> Result<Scored> {
        let (vector, fallbacks) = self.assemble(record, variant)?;
        let probability = self.scorer.score(&vector)?;
        let result = self.engine.decide(probability);
        debug!(
            probability,
            decision = %result.decision,
            features_used = vector.non_zero_count(),
            "Scored record"
        );
        Ok(Scored {
            vector,
            result,
            fallbacks,
        })
    }

    pub fn score_demo(&self, input: &DemoClientInput) -> Result<DemoPrediction> {
        input.validate()?;
        let scored = self.score_record(&input.to_record(), InputVariant::Demo)?;
        Ok(DemoPrediction {
            risk_level: RiskLevel::from_probability(scored.result.probability),
            analysis: ClientAnalysis::from_demo(input),
            scored,
        })
    }

    pub fn score_complete(&self, input: &CompleteClientInput) -> Result<Scored> {
        input.validate()?;
        self.score_record(&input.to_record(), InputVariant::Complete)
    }

    /// Top-K ranked attributions for a partial record
    pub fn explain_record(
        &self,
        record: &PartialClientRecord,
        variant: InputVariant,
    ) -> Result<Vec<AttributionEntry>> {
        let explainer = self
            .explainer
            .as_ref()
            .ok_or_else(|| Error::Unavailable("no attribution explainer is loaded".to_string()))?;

        let (vector, _) = self.assemble(record, variant)?;
        let attributions = explainer.explain(vector.as_slice())?;
        explain::rank(
            self.schema.names(),
            &attributions,
            vector.as_slice(),
            self.top_k,
        )
    }

    pub fn explain_demo(&self, input: &DemoClientInput) -> Result<Vec<AttributionEntry>> {
        input.validate()?;
        self.explain_record(&input.to_record(), InputVariant::Demo)
    }
}

/// Builder for [`ScoringContext`]
pub struct ContextBuilder {
    schema: FeatureSchema,
    scorer: Arc<dyn Scorer>,
    explainer: Option<Arc<dyn Explainer>>,
    imputer: Option<Arc<dyn Imputer>>,
    threshold: Option<f64>,
    top_k: usize,
    imputation: ImputationPolicy,
}

impl ContextBuilder {
    pub fn new(schema: FeatureSchema, scorer: Arc<dyn Scorer>) -> Self {
        Self {
            schema,
            scorer,
            explainer: None,
            imputer: None,
            threshold: None,
            top_k: DEFAULT_TOP_K,
            imputation: ImputationPolicy::None,
        }
    }

    pub fn explainer(mut self, explainer: Arc<dyn Explainer>) -> Self {
        self.explainer = Some(explainer);
        self
    }

    pub fn imputer(mut self, imputer: Arc<dyn Imputer>) -> Self {
        self.imputer = Some(imputer);
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn imputation(mut self, policy: ImputationPolicy) -> Self {
        self.imputation = policy;
        self
    }

    pub fn build(self) -> Result<ScoringContext> {
        if self.top_k == 0 {
            return Err(Error::InvalidConfig("top_k must be at least 1".to_string()));
        }
        let engine = match self.threshold {
            Some(t) => DecisionEngine::new(t)?,
            None => DecisionEngine::default(),
        };
        let expected_dim = self.schema.len();

        Ok(ScoringContext {
            schema: Arc::new(self.schema),
            builder: FeatureVectorBuilder::new(CategoricalEncoder::new()),
            scorer: ScorerAdapter::new(self.scorer, expected_dim),
            explainer: self.explainer,
            imputer: self.imputer,
            engine,
            top_k: self.top_k,
            imputation: self.imputation,
        })
    }
}
