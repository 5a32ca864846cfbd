//! Error types for plotweb-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal server error")]
    InternalError,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "success": false,
            "message": self.to_string(),
        });
        (self.status(), body.to_string()).into_response()
    }
}

impl From<plotweb_core::CoreError> for ApiError {
    fn from(err: plotweb_core::CoreError) -> Self {
        use plotweb_core::ErrorCode;
        err.log();
        match err.code() {
            ErrorCode::FileNotFound | ErrorCode::UserNotFound | ErrorCode::MessageNotFound => {
                ApiError::NotFound {
                    resource: err.to_string(),
                }
            }
            ErrorCode::ImportFailed | ErrorCode::InvalidFormat => ApiError::BadRequest {
                message: err.to_string(),
            },
            _ => ApiError::InternalError,
        }
    }
}
