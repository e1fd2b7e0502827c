//! Error responses for the HTTP API.

use crate::error::VoxdocError;
use crate::storage::StorageError;
use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

/// An error rendered as `{"error": message}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn bad_gateway(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<VoxdocError> for ApiError {
    fn from(err: VoxdocError) -> Self {
        let api = match &err {
            VoxdocError::InvalidInput(msg) => ApiError::bad_request(msg.clone()),
            VoxdocError::NotFound(msg) => ApiError::not_found(msg.clone()),
            VoxdocError::Storage(StorageError::NotFound(_)) => ApiError::not_found(err.to_string()),
            VoxdocError::Storage(StorageError::InvalidName(_)) => ApiError::bad_request(err.to_string()),
            e if e.is_upstream() => ApiError::bad_gateway(err.to_string()),
            _ => ApiError::internal(err.to_string()),
        };

        if api.status.is_server_error() {
            error!(status = %api.status, error = %err, "Request failed");
        } else {
            warn!(status = %api.status, error = %err, "Request rejected");
        }
        api
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self {
            status: err.status(),
            message: err.body_text(),
        }
    }
}
