//! Categorical encoding
//!
//! Maps the enumerated string inputs onto the integer codes the model was
//! trained with. Unknown values never fail: they map to a fixed fallback
//! code and the caller is told so it can surface a warning.

use serde::Serialize;

/// Categorical fields known to the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoricalField {
    /// `CODE_GENDER`
    Gender,
    /// `NAME_EDUCATION_TYPE`
    Education,
}

const GENDER_CODES: [(&str, i32); 3] = [("M", 1), ("F", 0), ("XNA", 2)];
const GENDER_FALLBACK: i32 = 1;

const EDUCATION_CODES: [(&str, i32); 5] = [
    ("Secondary / secondary special", 0),
    ("Higher education", 1),
    ("Incomplete higher", 2),
    ("Lower secondary", 3),
    ("Academic degree", 4),
];
const EDUCATION_FALLBACK: i32 = 0;

impl CategoricalField {
    /// Resolve the feature column name to a categorical field
    pub fn from_feature(name: &str) -> Option<Self> {
        match name {
            "CODE_GENDER" => Some(CategoricalField::Gender),
            "NAME_EDUCATION_TYPE" => Some(CategoricalField::Education),
            _ => None,
        }
    }

    pub fn feature_name(&self) -> &'static str {
        match self {
            CategoricalField::Gender => "CODE_GENDER",
            CategoricalField::Education => "NAME_EDUCATION_TYPE",
        }
    }

    fn table(&self) -> &'static [(&'static str, i32)] {
        match self {
            CategoricalField::Gender => &GENDER_CODES,
            CategoricalField::Education => &EDUCATION_CODES,
        }
    }

    /// Code used for any value outside the closed enumeration
    pub fn fallback(&self) -> i32 {
        match self {
            CategoricalField::Gender => GENDER_FALLBACK,
            CategoricalField::Education => EDUCATION_FALLBACK,
        }
    }
}

/// Result of encoding a raw categorical value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoded {
    pub code: i32,
    /// True when the raw value was not part of the enumeration
    pub fallback: bool,
}

/// Stateless encoder over the fixed categorical tables
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoricalEncoder;

impl CategoricalEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encode a raw value, falling back silently on unknown input
    #[inline]
    pub fn encode(&self, field: CategoricalField, raw: &str) -> i32 {
        self.encode_checked(field, raw).code
    }

    /// Encode a raw value and report whether the fallback was used
    pub fn encode_checked(&self, field: CategoricalField, raw: &str) -> Encoded {
        match field.table().iter().find(|(label, _)| *label == raw) {
            Some((_, code)) => Encoded {
                code: *code,
                fallback: false,
            },
            None => Encoded {
                code: field.fallback(),
                fallback: true,
            },
        }
    }
}
