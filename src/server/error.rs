use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_with::skip_serializing_none;
use thiserror::Error;

use crate::client::ClientError;

/// Request-level failures and their HTTP mapping.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed parameter; the message is the error kind itself.
    #[error("{0}")]
    Validation(String),

    /// Query string that does not fit the endpoint's parameters, e.g. a repeated key.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("unrecognized input")]
    UnrecognizedInput,

    #[error("upstream_error: {0}")]
    Upstream(#[from] ClientError),

    #[error("normalize_failed: {0}")]
    NormalizeFailed(String),

    #[error("not_found")]
    NotFound,
}

impl ApiError {
    pub fn missing(param: &str) -> Self {
        Self::Validation(format!("missing {param}"))
    }

    pub fn invalid(param: &str) -> Self {
        Self::Validation(format!("invalid {param}"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Self::UnrecognizedInput => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Upstream(_) | Self::NormalizeFailed(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidQuery(rejection.body_text())
    }
}

/// Wire shape of every error: `{error, detail?}`.
#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub detail: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Validation(msg) => ErrorBody {
                error: msg,
                detail: None,
            },
            Self::InvalidQuery(detail) => ErrorBody {
                error: "invalid query".to_string(),
                detail: Some(detail),
            },
            Self::UnrecognizedInput => ErrorBody {
                error: "unrecognized input".to_string(),
                detail: None,
            },
            Self::Upstream(err) => {
                tracing::warn!(target: "api", error = %err, "upstream failure");
                ErrorBody {
                    error: "upstream_error".to_string(),
                    detail: Some(err.to_string()),
                }
            }
            Self::NormalizeFailed(detail) => {
                tracing::warn!(target: "api", detail = %detail, "upstream payload failed normalization");
                ErrorBody {
                    error: "normalize_failed".to_string(),
                    detail: Some(detail),
                }
            }
            Self::NotFound => ErrorBody {
                error: "not_found".to_string(),
                detail: None,
            },
        };

        (status, Json(body)).into_response()
    }
}
