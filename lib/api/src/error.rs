use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use creditx_core::Error;
use std::fmt;

/// Pipeline error rendered as `{"error": message, "kind": kind}`
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            Error::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Unavailable(_) | Error::SchemaLoad(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Alignment { .. } | Error::Scoring(_) | Error::InvalidConfig(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(kind = self.0.kind(), "Request failed: {}", self.0);
        } else {
            tracing::debug!(kind = self.0.kind(), "Request rejected: {}", self.0);
        }
        HttpResponse::build(status).json(serde_json::json!({
            "error": self.0.to_string(),
            "kind": self.0.kind(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::validation("AMT_CREDIT", "negative"), 422),
            (Error::NotFound("client 1".to_string()), 404),
            (Error::Unavailable("no explainer".to_string()), 503),
            (Error::SchemaLoad("missing".to_string()), 503),
            (Error::Scoring("overflow".to_string()), 500),
            (Error::InvalidConfig("threshold 1.7".to_string()), 500),
            (
                Error::Alignment {
                    features: 3,
                    attributions: 2,
                    values: 3,
                },
                500,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status_code().as_u16(), status);
        }
    }
}
