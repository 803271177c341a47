use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid value for {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Attribution misaligned: {features} features, {attributions} attributions, {values} input values")]
    Alignment {
        features: usize,
        attributions: usize,
        values: usize,
    },

    #[error("Scoring failed: {0}")]
    Scoring(String),

    #[error("Failed to load artifact: {0}")]
    SchemaLoad(String),

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Stable, wire-level name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation { .. } => "validation",
            Error::Alignment { .. } => "alignment",
            Error::Scoring(_) => "scoring",
            Error::SchemaLoad(_) => "schema_load",
            Error::Unavailable(_) => "unavailable",
            Error::NotFound(_) => "not_found",
            Error::InvalidConfig(_) => "config",
        }
    }
}
