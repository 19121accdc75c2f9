// src/error.rs
//! Request-level error taxonomy and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Longest diagnostic detail returned to a caller.
const MAX_DETAIL_CHARS: usize = 200;

/// Failures the orchestrator reports to its caller.
///
/// Source outages are absent on purpose: they are absorbed into the prompt as
/// sentinel text and never become a request error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SummaryError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("summary generation failed after {attempts} attempt(s): {message}")]
    GenerationFailure { message: String, attempts: u32 },

    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl SummaryError {
    pub fn status(&self) -> StatusCode {
        match self {
            SummaryError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            SummaryError::GenerationFailure { .. } | SummaryError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short label used for the `outcome` metric label and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SummaryError::InvalidInput(_) => "invalid_input",
            SummaryError::GenerationFailure { .. } => "generation_failure",
            SummaryError::Unexpected(_) => "unexpected",
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            SummaryError::InvalidInput(msg) => ErrorBody {
                error: msg.clone(),
                detail: None,
            },
            SummaryError::GenerationFailure { message, .. } => ErrorBody {
                error: "Failed to generate summary".to_string(),
                detail: Some(truncate_chars(message, MAX_DETAIL_CHARS)),
            },
            SummaryError::Unexpected(_) => ErrorBody::internal(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorBody {
    pub fn internal() -> Self {
        Self {
            error: "Internal server error".to_string(),
            detail: None,
        }
    }
}

impl IntoResponse for SummaryError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max).collect();
    out.push_str("...");
    out
}
