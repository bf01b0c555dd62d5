// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with the proxy's response envelopes.

use crate::models::ProxyErrorEnvelope;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("URL is missing or invalid")]
    MissingParams,

    #[error("Failed to fetch data: {0}")]
    UpstreamTransport(String),

    #[error("HTTP request failed with status {0}")]
    UpstreamStatus(u16),
}

/// Validation error body, in the WordPress REST error shape.
#[derive(Serialize)]
struct ValidationErrorResponse {
    code: &'static str,
    message: String,
    data: ValidationErrorData,
}

#[derive(Serialize)]
struct ValidationErrorData {
    status: u16,
}

fn validation_error(code: &'static str, message: String) -> Response {
    let status = StatusCode::BAD_REQUEST;
    let body = ValidationErrorResponse {
        code,
        message,
        data: ValidationErrorData {
            status: status.as_u16(),
        },
    };
    (status, Json(body)).into_response()
}

fn upstream_error(status: StatusCode, message: String, debug_info: String) -> Response {
    let body = ProxyErrorEnvelope {
        error: true,
        message,
        debug_info,
    };
    (status, Json(body)).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::MissingParams => validation_error("missing_params", self.to_string()),
            AppError::UpstreamTransport(msg) => upstream_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch data".to_string(),
                msg,
            ),
            AppError::UpstreamStatus(code) => {
                // Mirror the upstream status when it is a valid HTTP code.
                let status =
                    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY);
                upstream_error(
                    status,
                    format!("HTTP request failed with status {code}"),
                    format!("Unexpected HTTP status code: {code}"),
                )
            }
        }
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
