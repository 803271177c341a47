//! Client input records
//!
//! [`PartialClientRecord`] is the generic, sparse input the builder consumes.
//! [`DemoClientInput`] and [`CompleteClientInput`] are the two request
//! shapes accepted at the boundary; both are validated here, before any
//! vector is built.

use crate::encoder::CategoricalField;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single raw input value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Category(String),
    Null,
}

impl FieldValue {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Category(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Category(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Category(value)
    }
}

impl From<Option<f64>> for FieldValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(FieldValue::Null, FieldValue::Number)
    }
}

/// Sparse mapping from field name to raw value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartialClientRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl PartialClientRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// True when the field is present with a non-null value
    pub fn has_value(&self, name: &str) -> bool {
        self.fields.get(name).is_some_and(|v| !v.is_null())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Reject non-finite numbers and text supplied for numeric fields
    pub fn validate(&self) -> Result<()> {
        for (name, value) in &self.fields {
            match value {
                FieldValue::Number(n) => ensure_finite(name, *n)?,
                FieldValue::Category(_) if CategoricalField::from_feature(name).is_none() => {
                    return Err(Error::validation(name, "expected a numeric value"));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn ensure_finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::validation(field, "must be a finite number"))
    }
}

fn ensure_unit_interval(field: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !(0.0..=1.0).contains(&v) => {
            Err(Error::validation(field, format!("must be within [0, 1], got {}", v)))
        }
        Some(v) => ensure_finite(field, v),
        None => Ok(()),
    }
}

fn ensure_positive(field: &str, value: f64) -> Result<()> {
    ensure_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(Error::validation(field, format!("must be greater than 0, got {}", value)))
    }
}

fn default_ext_source() -> Option<f64> {
    Some(0.5)
}

fn default_goods_price() -> f64 {
    450_000.0
}

fn default_annuity() -> f64 {
    25_000.0
}

fn default_credit() -> f64 {
    500_000.0
}

fn default_days_birth() -> i64 {
    -15_000
}

fn default_payment_perc() -> Option<f64> {
    Some(1.0)
}

fn default_gender() -> String {
    "M".to_string()
}

fn default_education() -> String {
    "Secondary / secondary special".to_string()
}

/// Reduced input restricted to the highest-signal fields, with range checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoClientInput {
    #[serde(rename = "EXT_SOURCE_1", default = "default_ext_source")]
    pub ext_source_1: Option<f64>,
    #[serde(rename = "EXT_SOURCE_2", default = "default_ext_source")]
    pub ext_source_2: Option<f64>,
    #[serde(rename = "EXT_SOURCE_3", default = "default_ext_source")]
    pub ext_source_3: Option<f64>,
    #[serde(rename = "AMT_GOODS_PRICE", default = "default_goods_price")]
    pub amt_goods_price: f64,
    #[serde(rename = "AMT_ANNUITY", default = "default_annuity")]
    pub amt_annuity: f64,
    #[serde(rename = "AMT_CREDIT", default = "default_credit")]
    pub amt_credit: f64,
    #[serde(rename = "DAYS_BIRTH", default = "default_days_birth")]
    pub days_birth: i64,
    #[serde(rename = "INST_PAYMENT_PERC_mean", default = "default_payment_perc")]
    pub inst_payment_perc_mean: Option<f64>,
    #[serde(rename = "CODE_GENDER", default = "default_gender")]
    pub code_gender: String,
    #[serde(rename = "NAME_EDUCATION_TYPE", default = "default_education")]
    pub name_education_type: String,
}

impl Default for DemoClientInput {
    fn default() -> Self {
        Self {
            ext_source_1: default_ext_source(),
            ext_source_2: default_ext_source(),
            ext_source_3: default_ext_source(),
            amt_goods_price: default_goods_price(),
            amt_annuity: default_annuity(),
            amt_credit: default_credit(),
            days_birth: default_days_birth(),
            inst_payment_perc_mean: default_payment_perc(),
            code_gender: default_gender(),
            name_education_type: default_education(),
        }
    }
}

impl DemoClientInput {
    /// Boundary range checks; nothing is built when this fails
    pub fn validate(&self) -> Result<()> {
        ensure_unit_interval("EXT_SOURCE_1", self.ext_source_1)?;
        ensure_unit_interval("EXT_SOURCE_2", self.ext_source_2)?;
        ensure_unit_interval("EXT_SOURCE_3", self.ext_source_3)?;
        ensure_positive("AMT_GOODS_PRICE", self.amt_goods_price)?;
        ensure_positive("AMT_ANNUITY", self.amt_annuity)?;
        ensure_positive("AMT_CREDIT", self.amt_credit)?;
        if self.days_birth >= 0 {
            return Err(Error::validation(
                "DAYS_BIRTH",
                format!("must be negative (days before application), got {}", self.days_birth),
            ));
        }
        if let Some(perc) = self.inst_payment_perc_mean {
            ensure_finite("INST_PAYMENT_PERC_mean", perc)?;
            if perc < 0.0 {
                return Err(Error::validation(
                    "INST_PAYMENT_PERC_mean",
                    format!("must be at least 0, got {}", perc),
                ));
            }
        }
        Ok(())
    }

    pub fn to_record(&self) -> PartialClientRecord {
        PartialClientRecord::new()
            .with("EXT_SOURCE_1", self.ext_source_1)
            .with("EXT_SOURCE_2", self.ext_source_2)
            .with("EXT_SOURCE_3", self.ext_source_3)
            .with("AMT_GOODS_PRICE", self.amt_goods_price)
            .with("AMT_ANNUITY", self.amt_annuity)
            .with("AMT_CREDIT", self.amt_credit)
            .with("DAYS_BIRTH", self.days_birth)
            .with("INST_PAYMENT_PERC_mean", self.inst_payment_perc_mean)
            .with("CODE_GENDER", self.code_gender.as_str())
            .with("NAME_EDUCATION_TYPE", self.name_education_type.as_str())
    }
}

/// Full input: core amounts are required, anything else may be added by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteClientInput {
    #[serde(rename = "AMT_INCOME_TOTAL")]
    pub amt_income_total: f64,
    #[serde(rename = "AMT_CREDIT")]
    pub amt_credit: f64,
    #[serde(rename = "AMT_ANNUITY")]
    pub amt_annuity: f64,
    #[serde(rename = "AMT_GOODS_PRICE")]
    pub amt_goods_price: f64,
    #[serde(rename = "DAYS_BIRTH")]
    pub days_birth: i64,
    #[serde(rename = "EXT_SOURCE_1", default)]
    pub ext_source_1: Option<f64>,
    #[serde(rename = "EXT_SOURCE_2", default)]
    pub ext_source_2: Option<f64>,
    #[serde(rename = "EXT_SOURCE_3", default)]
    pub ext_source_3: Option<f64>,
    #[serde(rename = "CODE_GENDER", default = "default_gender")]
    pub code_gender: String,
    #[serde(rename = "NAME_EDUCATION_TYPE", default = "default_education")]
    pub name_education_type: String,
    /// Any other schema feature, applied after the named fields
    #[serde(default)]
    pub additional_features: BTreeMap<String, f64>,
}

impl CompleteClientInput {
    pub fn validate(&self) -> Result<()> {
        ensure_finite("AMT_INCOME_TOTAL", self.amt_income_total)?;
        ensure_finite("AMT_CREDIT", self.amt_credit)?;
        ensure_finite("AMT_ANNUITY", self.amt_annuity)?;
        ensure_finite("AMT_GOODS_PRICE", self.amt_goods_price)?;
        for (name, value) in [
            ("EXT_SOURCE_1", self.ext_source_1),
            ("EXT_SOURCE_2", self.ext_source_2),
            ("EXT_SOURCE_3", self.ext_source_3),
        ] {
            if let Some(v) = value {
                ensure_finite(name, v)?;
            }
        }
        for (name, value) in &self.additional_features {
            ensure_finite(name, *value)?;
        }
        Ok(())
    }

    pub fn to_record(&self) -> PartialClientRecord {
        let mut record = PartialClientRecord::new()
            .with("AMT_INCOME_TOTAL", self.amt_income_total)
            .with("AMT_CREDIT", self.amt_credit)
            .with("AMT_ANNUITY", self.amt_annuity)
            .with("AMT_GOODS_PRICE", self.amt_goods_price)
            .with("DAYS_BIRTH", self.days_birth)
            .with("EXT_SOURCE_1", self.ext_source_1)
            .with("EXT_SOURCE_2", self.ext_source_2)
            .with("EXT_SOURCE_3", self.ext_source_3)
            .with("CODE_GENDER", self.code_gender.as_str())
            .with("NAME_EDUCATION_TYPE", self.name_education_type.as_str());
        for (name, value) in &self.additional_features {
            record.insert(name.clone(), *value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_value_untagged() {
        let record: PartialClientRecord = serde_json::from_value(json!({
            "AMT_CREDIT": 1000.0,
            "CODE_GENDER": "F",
            "EXT_SOURCE_1": null
        }))
        .unwrap();

        assert_eq!(record.get("AMT_CREDIT"), Some(&FieldValue::Number(1000.0)));
        assert_eq!(record.get("CODE_GENDER").and_then(|v| v.as_str()), Some("F"));
        assert!(record.get("EXT_SOURCE_1").unwrap().is_null());
        assert!(!record.has_value("EXT_SOURCE_1"));
    }

    #[test]
    fn test_record_validation_rejects_text_for_numeric() {
        let record = PartialClientRecord::new().with("AMT_CREDIT", "lots");
        assert!(matches!(
            record.validate(),
            Err(Error::Validation { ref field, .. }) if field == "AMT_CREDIT"
        ));

        let record = PartialClientRecord::new().with("CODE_GENDER", "M");
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_demo_defaults() {
        let input: DemoClientInput = serde_json::from_value(json!({})).unwrap();
        assert_eq!(input, DemoClientInput::default());
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_demo_explicit_null_clears_optional() {
        let input: DemoClientInput =
            serde_json::from_value(json!({ "EXT_SOURCE_1": null })).unwrap();
        assert_eq!(input.ext_source_1, None);
        assert_eq!(input.ext_source_2, Some(0.5));

        let record = input.to_record();
        assert!(!record.has_value("EXT_SOURCE_1"));
        assert!(record.has_value("EXT_SOURCE_2"));
    }

    #[test]
    fn test_demo_range_checks() {
        let cases = [
            (json!({ "EXT_SOURCE_2": 1.5 }), "EXT_SOURCE_2"),
            (json!({ "AMT_CREDIT": -100000 }), "AMT_CREDIT"),
            (json!({ "AMT_GOODS_PRICE": 0 }), "AMT_GOODS_PRICE"),
            (json!({ "AMT_ANNUITY": -1 }), "AMT_ANNUITY"),
            (json!({ "DAYS_BIRTH": 100 }), "DAYS_BIRTH"),
            (json!({ "INST_PAYMENT_PERC_mean": -0.1 }), "INST_PAYMENT_PERC_mean"),
        ];

        for (body, expected) in cases {
            let input: DemoClientInput = serde_json::from_value(body).unwrap();
            match input.validate() {
                Err(Error::Validation { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected validation error on {}, got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn test_complete_requires_core_amounts() {
        let missing = serde_json::from_value::<CompleteClientInput>(json!({
            "AMT_CREDIT": 1.0
        }));
        assert!(missing.is_err());
    }

    #[test]
    fn test_complete_additional_features_override() {
        let input: CompleteClientInput = serde_json::from_value(json!({
            "AMT_INCOME_TOTAL": 200000.0,
            "AMT_CREDIT": 500000.0,
            "AMT_ANNUITY": 25000.0,
            "AMT_GOODS_PRICE": 450000.0,
            "DAYS_BIRTH": -12000,
            "additional_features": { "AMT_CREDIT": 1.0, "OWN_CAR_AGE": 3.0 }
        }))
        .unwrap();

        assert!(input.validate().is_ok());
        let record = input.to_record();
        assert_eq!(record.get("AMT_CREDIT").and_then(|v| v.as_f64()), Some(1.0));
        assert_eq!(record.get("OWN_CAR_AGE").and_then(|v| v.as_f64()), Some(3.0));
        assert_eq!(record.get("CODE_GENDER").and_then(|v| v.as_str()), Some("M"));
    }
}
