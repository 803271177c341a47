//! Feature vector builder
//!
//! Turns a sparse client record into the dense, schema-ordered vector the
//! classifier consumes.
//!
//! Every column starts at `0.0`. Zero is a real feature value here, not a
//! "missing" marker: fields the client leaves out are NOT imputed by the
//! builder. Imputation, when enabled, has already happened upstream.

use crate::encoder::{CategoricalEncoder, CategoricalField};
use crate::record::{FieldValue, PartialClientRecord};
use crate::{FeatureSchema, FeatureVector};
use serde::Serialize;

/// A categorical value that was not recognised and fell back to the default code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoricalFallback {
    pub field: String,
    pub raw: String,
    pub code: i32,
}

/// Built vector plus the fallbacks taken while building it
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltVector {
    pub vector: FeatureVector,
    pub fallbacks: Vec<CategoricalFallback>,
}

/// Builds schema-aligned feature vectors
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureVectorBuilder {
    encoder: CategoricalEncoder,
}

impl FeatureVectorBuilder {
    pub fn new(encoder: CategoricalEncoder) -> Self {
        Self { encoder }
    }

    /// Build a vector of exactly `schema.len()` columns
    ///
    /// - fields unknown to the schema are dropped
    /// - nulls are skipped, leaving the default
    /// - categorical text goes through the encoder
    /// - numbers are written as-is, including for categorical columns,
    ///   where they are taken as already-encoded codes
    pub fn build(&self, schema: &FeatureSchema, record: &PartialClientRecord) -> BuiltVector {
        let mut vector = FeatureVector::zeros(schema.len());
        let mut fallbacks = Vec::new();

        for (name, value) in record.iter() {
            let Some(position) = schema.position(name) else {
                continue;
            };

            match value {
                FieldValue::Null => {}
                FieldValue::Number(n) => vector.set(position, *n),
                FieldValue::Category(raw) => match CategoricalField::from_feature(name) {
                    Some(field) => {
                        let encoded = self.encoder.encode_checked(field, raw);
                        if encoded.fallback {
                            fallbacks.push(CategoricalFallback {
                                field: name.to_string(),
                                raw: raw.clone(),
                                code: encoded.code,
                            });
                        }
                        vector.set(position, f64::from(encoded.code));
                    }
                    // Text in a numeric column is rejected at the boundary
                    None => {}
                },
            }
        }

        BuiltVector { vector, fallbacks }
    }
}

/// Convenience wrapper around [`FeatureVectorBuilder::build`]
pub fn build(
    schema: &FeatureSchema,
    record: &PartialClientRecord,
    encoder: &CategoricalEncoder,
) -> FeatureVector {
    FeatureVectorBuilder::new(*encoder).build(schema, record).vector
}
