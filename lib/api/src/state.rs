use crate::error::ApiError;
use creditx_core::Error;
use creditx_storage::{ClientStore, LoadedArtifacts};

/// What the server is serving: loaded artifacts, or the reason they failed
pub enum ServiceState {
    Ready(Box<LoadedArtifacts>),
    Unavailable { reason: String },
}

impl ServiceState {
    pub fn ready(artifacts: LoadedArtifacts) -> Self {
        ServiceState::Ready(Box::new(artifacts))
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        ServiceState::Unavailable {
            reason: reason.into(),
        }
    }

    /// Loaded artifacts, or a 503 carrying the load failure
    pub fn artifacts(&self) -> Result<&LoadedArtifacts, ApiError> {
        match self {
            ServiceState::Ready(artifacts) => Ok(&**artifacts),
            ServiceState::Unavailable { reason } => Err(ApiError(Error::Unavailable(format!(
                "model not loaded: {}",
                reason
            )))),
        }
    }

    pub fn clients(&self) -> Result<&ClientStore, ApiError> {
        self.artifacts()?
            .clients
            .as_deref()
            .ok_or_else(|| ApiError(Error::Unavailable("no demo clients loaded".to_string())))
    }
}
