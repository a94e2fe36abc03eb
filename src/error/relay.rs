use super::credential::CredentialError;
use crate::upstream::UPSTREAM_BODY_PREVIEW_CHARS;
use crate::utils::logging::body_preview;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum RelayError {
    /// Client fault detected before any upstream I/O.
    #[error("{0}")]
    Validation(String),

    /// Inbound body could not be parsed as the expected JSON.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// Transport failure that survived the final retry attempt.
    #[error("HTTP request error: {0}")]
    Network(#[from] reqwest::Error),

    /// Every candidate model failed with a non-2xx status; carries the last one.
    #[error("Upstream error: status={status}, body={body:.200}")]
    Upstream { status: StatusCode, body: String },

    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// 2xx upstream response whose body is not JSON.
    #[error("malformed upstream payload: {0}")]
    MalformedUpstream(#[from] serde_json::Error),

    #[error("no model candidates configured")]
    NoModelCandidates,
}

impl RelayError {
    pub(crate) fn missing_prompt() -> Self {
        RelayError::Validation("prompt is required".to_string())
    }
}

impl From<JsonRejection> for RelayError {
    fn from(rejection: JsonRejection) -> Self {
        RelayError::InvalidBody(rejection.body_text())
    }
}

/// JSON error payload returned by the relay.
#[derive(Debug, Serialize)]
pub struct RelayErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl RelayErrorBody {
    fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status: None,
            body: None,
            details: None,
        }
    }

    fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            details: Some(details.into()),
            ..Self::message(error)
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            RelayError::Validation(message) => {
                tracing::warn!(message = %message, "Generate request rejected");
                (StatusCode::BAD_REQUEST, RelayErrorBody::message(message))
            }

            RelayError::InvalidBody(details) => {
                tracing::warn!(details = %details, "Generate request body rejected");
                (
                    StatusCode::BAD_REQUEST,
                    RelayErrorBody::with_details("invalid request body", details),
                )
            }

            RelayError::Upstream { status, body } => {
                tracing::warn!(
                    status = %status,
                    raw_body = %body_preview(&body, UPSTREAM_BODY_PREVIEW_CHARS),
                    "All model candidates failed upstream"
                );
                (
                    StatusCode::BAD_GATEWAY,
                    RelayErrorBody {
                        status: Some(status.as_u16()),
                        body: Some(body),
                        ..RelayErrorBody::message("upstream error")
                    },
                )
            }

            other @ (RelayError::Network(_)
            | RelayError::Credential(_)
            | RelayError::MalformedUpstream(_)
            | RelayError::NoModelCandidates) => {
                tracing::error!(error = %other, "Generate request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    RelayErrorBody::with_details("internal error", other.to_string()),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
