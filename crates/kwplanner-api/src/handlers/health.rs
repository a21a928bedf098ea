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

//! Health check handlers

use crate::error::ApiError;
use crate::models::{ApiVersion, HealthResponse};
use http_body_util::Full;
use hyper::{Request, Response, StatusCode, body::Bytes};
use tracing::info;

/// Liveness probe
/// GET /api/v1/health
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health_check(_req: Request<hyper::body::Incoming>) -> Result<Response<Full<Bytes>>, ApiError> {
    info!("Processing health check request");

    let health_response = HealthResponse {
        status: "ok".to_string(),
        message: "KW Planner API".to_string(),
    };

    let response_json = serde_json::to_string(&health_response)?;

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(response_json)))?)
}

/// Version information handler
/// GET /api/v1/version
#[utoipa::path(
    get,
    path = "/api/v1/version",
    responses(
        (status = 200, description = "API version information", body = ApiVersion)
    ),
    tag = "Health"
)]
pub async fn version_info(_req: Request<hyper::body::Incoming>) -> Result<Response<Full<Bytes>>, ApiError> {
    info!("Processing version info request");

    let version_info = ApiVersion {
        version: env!("CARGO_PKG_VERSION").to_string(),
        build: format!("{}+{}", env!("CARGO_PKG_VERSION"), option_env!("GIT_HASH").unwrap_or("unknown")),
        features: vec![
            "site_analysis".to_string(),
            "niche_analysis".to_string(),
            "url_analysis".to_string(),
            "keyword_variations".to_string(),
            "theme_analysis".to_string(),
            "content_pruning".to_string(),
            "learning_dashboard".to_string(),
            "learning_export".to_string(),
            "cors_support".to_string(),
            "error_handling".to_string(),
        ],
    };

    let response_json = serde_json::to_string(&version_info)?;

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(response_json)))?)
}
