// KW Planner
// Copyright (C) 2025 KW Planner contributors

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Error handling for the API
//! Implements RFC 7807 Problem Details format
//!
//! Only request-level faults surface here: validation errors are client
//! faults, adapter faults are server faults. Failures of the invoked
//! analysis routine never become an `ApiError` — they travel inside the
//! analyze response body as a message string.

use http_body_util::Full;
use hyper::{Response, StatusCode, body::Bytes};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// API error types following REST conventions
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Request body exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: u64 },

    #[error("Internal server error: {message}")]
    InternalServerError { message: String },

    #[error("Serde JSON error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("Hyper error: {0}")]
    HyperError(#[from] hyper::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    HttpError(String),
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type identifier
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::BadRequest { .. } => "bad_request",
            ApiError::NotFound { .. } => "not_found",
            ApiError::PayloadTooLarge { .. } => "payload_too_large",
            ApiError::InternalServerError { .. } => "internal_server_error",
            ApiError::SerdeJsonError(_) => "json_error",
            ApiError::HyperError(_) => "http_error",
            ApiError::IoError(_) => "io_error",
            ApiError::HttpError(_) => "http_error",
        }
    }
}

/// RFC 7807 Problem Details response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// A URI reference that identifies the problem type
    #[serde(rename = "type")]
    pub problem_type: String,

    /// A short, human-readable summary of the problem type
    pub title: String,

    /// The HTTP status code generated by the origin server
    pub status: u16,

    /// A human-readable explanation specific to this occurrence
    pub detail: String,
}

impl ProblemDetails {
    /// Create a new problem details response
    pub fn new(error: &ApiError) -> Self {
        let status_code = error.status_code();

        Self {
            problem_type: format!("https://kwplanner.app/problems/{}", error.error_type()),
            title: Self::status_to_title(status_code),
            status: status_code.as_u16(),
            detail: error.to_string(),
        }
    }

    /// Convert status code to human-readable title
    fn status_to_title(status: StatusCode) -> String {
        match status {
            StatusCode::BAD_REQUEST => "Bad Request".to_string(),
            StatusCode::NOT_FOUND => "Not Found".to_string(),
            StatusCode::PAYLOAD_TOO_LARGE => "Payload Too Large".to_string(),
            StatusCode::INTERNAL_SERVER_ERROR => "Internal Server Error".to_string(),
            _ => "Unknown Error".to_string(),
        }
    }
}

/// Convert ApiError to HTTP response
impl From<ApiError> for Response<Full<Bytes>> {
    fn from(error: ApiError) -> Self {
        let status_code = error.status_code();
        let problem_details = ProblemDetails::new(&error);

        error!("API Error: {} - {}", status_code, error);

        let json = match serde_json::to_string(&problem_details) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize error response: {}", e);
                r#"{"type":"https://kwplanner.app/problems/internal_server_error","title":"Internal Server Error","status":500,"detail":"An internal error occurred"}"#.to_string()
            }
        };

        Response::builder()
            .status(status_code)
            .header("content-type", "application/problem+json")
            .header("cache-control", "no-cache")
            .body(Full::new(Bytes::from(json)))
            .unwrap_or_else(|e| {
                error!("Failed to build error response: {}", e);
                Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .body(Full::new(Bytes::from("Internal Server Error")))
                    .unwrap()
            })
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

impl From<hyper::http::Error> for ApiError {
    fn from(err: hyper::http::Error) -> Self {
        ApiError::HttpError(err.to_string())
    }
}
