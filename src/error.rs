//! Common error type and result alias.
//!
//! Every failure a request can hit maps onto one `AppError` variant, and the
//! `IntoResponse` impl turns it into a JSON error body with the matching
//! HTTP status: validation problems are 400, upstream trouble is 502, and an
//! exhausted poll budget is 504.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    /// The caller's upload was missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// A network-level failure talking to an external API.
    #[error("http client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// An external API was reachable but returned a failure response.
    #[error("{0}")]
    Upstream(String),

    /// The generation job reached the failed state.
    #[error("generation failed: {0}")]
    Generation(String),

    /// The generation job never reached a terminal state within the poll budget.
    #[error("timed out waiting for generation after {0} attempts")]
    Timeout(u32),
}

/// JSON body rendered for every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::HttpClient(_) | AppError::Upstream(_) | AppError::Generation(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::HttpClient(_) | AppError::Upstream(_) => "upstream",
            AppError::Generation(_) => "generation",
            AppError::Timeout(_) => "timeout",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind().to_string(),
            message: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let err = AppError::Validation("missing 'person' image field".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn upstream_and_generation_map_to_bad_gateway() {
        let upstream = AppError::Upstream("host returned 500".to_string());
        assert_eq!(upstream.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(upstream.kind(), "upstream");

        let generation = AppError::Generation("flow rejected inputs".to_string());
        assert_eq!(generation.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(generation.kind(), "generation");
    }

    #[test]
    fn timeout_maps_to_gateway_timeout() {
        let err = AppError::Timeout(20);
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.kind(), "timeout");
        assert!(err.to_string().contains("20 attempts"));
    }
}
