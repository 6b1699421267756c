//! API error handling

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain_claims::{ClaimError, MalformedInputError, NonConvergenceError};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Malformed claim: {0}")]
    MalformedInput(#[from] MalformedInputError),

    #[error("Evaluation aborted: {0}")]
    NonConvergence(#[from] NonConvergenceError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorResponse {
    /// Body for a per-claim failure, also used inside batch responses
    pub fn from_claim_error(err: &ClaimError) -> Self {
        match err {
            ClaimError::MalformedInput(e) => Self {
                error: "malformed_input".to_string(),
                message: e.to_string(),
                field: Some(e.field().to_string()),
            },
            ClaimError::NonConvergence(e) => Self {
                error: "non_convergence".to_string(),
                message: e.to_string(),
                field: None,
            },
        }
    }
}

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        match err {
            ClaimError::MalformedInput(e) => ApiError::MalformedInput(e),
            ClaimError::NonConvergence(e) => ApiError::NonConvergence(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => {
                warn!(error = %msg, "Rejected request body");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: "bad_request".to_string(),
                        message: msg,
                        field: None,
                    },
                )
            }
            ApiError::MalformedInput(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse::from_claim_error(&ClaimError::MalformedInput(e)),
            ),
            ApiError::NonConvergence(e) => {
                error!(error = %e, "Claim evaluation did not converge");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::from_claim_error(&ClaimError::NonConvergence(e)),
                )
            }
            ApiError::Internal(msg) => {
                error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "internal_error".to_string(),
                        message: msg,
                        field: None,
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
