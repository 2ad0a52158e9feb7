use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use backend_application::AppError;
use backend_domain::PlatformError;

#[derive(Debug)]
pub enum HttpError {
    Unauthorized,
    Forbidden(String),
    BadRequest(String),
    Upstream {
        message: String,
        status: Option<u16>,
        details: Option<String>,
    },
    Unavailable(String),
    Internal(String),
}

impl From<AppError> for HttpError {
    fn from(value: AppError) -> Self {
        match value {
            AppError::Unauthorized => HttpError::Unauthorized,
            AppError::Forbidden(what) => HttpError::Forbidden(what),
            AppError::BadRequest(msg) => HttpError::BadRequest(msg),
            AppError::Vendor(err) => HttpError::Upstream {
                message: "vendor request failed".to_string(),
                status: err.status,
                details: Some(err.body.unwrap_or(err.message)),
            },
            AppError::Platform(PlatformError::Status { status, body }) => HttpError::Upstream {
                message: "platform request failed".to_string(),
                status: Some(status),
                details: Some(body),
            },
            AppError::Platform(err @ (PlatformError::Transport(_) | PlatformError::Decode(_))) => {
                HttpError::Upstream {
                    message: "platform request failed".to_string(),
                    status: None,
                    details: Some(err.to_string()),
                }
            }
            AppError::Platform(err) => HttpError::Internal(err.to_string()),
            err @ AppError::UserInfoUnavailable { .. } => HttpError::Unavailable(err.to_string()),
            AppError::Internal(err) => HttpError::Internal(err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retryable: Option<bool>,
}

impl ErrorBody {
    fn message(error: String) -> Self {
        Self {
            error,
            status: None,
            details: None,
            retryable: None,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            HttpError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorBody::message("unauthorized".to_string()),
            ),
            HttpError::Forbidden(what) => (
                StatusCode::FORBIDDEN,
                ErrorBody::message(format!("forbidden: {}", what)),
            ),
            HttpError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::message(format!("bad request: {}", msg)),
            ),
            HttpError::Upstream {
                message,
                status,
                details,
            } => (
                StatusCode::BAD_GATEWAY,
                ErrorBody {
                    status,
                    details,
                    ..ErrorBody::message(message)
                },
            ),
            HttpError::Unavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorBody {
                    retryable: Some(true),
                    ..ErrorBody::message(msg)
                },
            ),
            HttpError::Internal(msg) => {
                error!("internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::message(msg),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
