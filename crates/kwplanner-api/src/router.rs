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

//! HTTP routing for the API

use crate::config::Config;
use crate::error::ApiError;
use crate::handlers::{analyze, health};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::HeaderValue;
use hyper::{Method, Request, Response, StatusCode};
use kwplanner_core::EngineFactory;
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::OpenApi;

/// Shared per-process state handed to handlers.
///
/// The factory builds a fresh engine per request; nothing here is
/// mutable across requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub factory: Arc<dyn EngineFactory>,
}

/// HTTP router for the API
pub struct Router {
    state: AppState,
    openapi_spec: String,
}

impl Router {
    /// Create a new router
    pub fn new(state: AppState) -> Self {
        let openapi_spec = generate_openapi_spec();
        Self { state, openapi_spec }
    }

    /// Route a request to the appropriate handler
    pub async fn route(&self, req: Request<hyper::body::Incoming>) -> Result<Response<Full<Bytes>>, ApiError> {
        let path = req.uri().path().to_string();
        let method = req.method().clone();

        info!("Routing request: {} {}", method, path);

        // CORS preflight for browser clients
        if method == Method::OPTIONS && self.state.config.cors_enabled {
            return self.preflight();
        }

        match (&method, path.as_str()) {
            // Health endpoints
            (&Method::GET, "/api/v1/health") => health::health_check(req).await,
            (&Method::GET, "/api/v1/version") => health::version_info(req).await,

            // Analysis endpoint
            (&Method::POST, "/api/v1/analyze") => analyze::analyze(req, self.state.clone()).await,

            // Documentation
            (&Method::GET, "/docs") | (&Method::GET, "/docs/") => self.serve_docs().await,
            (&Method::GET, "/openapi.json") => self.serve_openapi_spec().await,

            _ => {
                warn!("Route not found: {} {}", method, path);
                Err(ApiError::NotFound {
                    message: format!("Route not found: {} {}", method, path),
                })
            }
        }
    }

    /// Attach CORS headers to any outgoing response, error responses
    /// included, so browser frontends can read them.
    ///
    /// A wildcard entry allows every origin; otherwise the request's
    /// `Origin` header is echoed back only when it appears in the
    /// configured list.
    pub fn apply_cors<B>(&self, mut response: Response<B>, request_origin: Option<&str>) -> Response<B> {
        if !self.state.config.cors_enabled {
            return response;
        }

        let origins = &self.state.config.cors_origins;
        let allowed = if origins.iter().any(|o| o == "*") {
            Some("*")
        } else {
            request_origin.filter(|origin| origins.iter().any(|o| o == *origin))
        };
        let Some(allowed) = allowed else {
            return response;
        };

        if let Ok(value) = HeaderValue::from_str(allowed) {
            response.headers_mut().insert("access-control-allow-origin", value);
        }
        if allowed != "*" {
            // Responses differ per origin; keep caches honest.
            response.headers_mut().insert("vary", HeaderValue::from_static("origin"));
        }
        response
            .headers_mut()
            .insert("access-control-allow-methods", HeaderValue::from_static("GET, POST, OPTIONS"));
        response
            .headers_mut()
            .insert("access-control-allow-headers", HeaderValue::from_static("content-type"));
        response
    }

    fn preflight(&self) -> Result<Response<Full<Bytes>>, ApiError> {
        Ok(Response::builder()
            .status(StatusCode::NO_CONTENT)
            .body(Full::new(Bytes::new()))?)
    }

    /// Serve OpenAPI documentation
    async fn serve_docs(&self) -> Result<Response<Full<Bytes>>, ApiError> {
        let swagger_ui_html = r#"
<!DOCTYPE html>
<html>
<head>
    <title>KW Planner API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@4.15.5/swagger-ui.css" />
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@4.15.5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = function() {
            SwaggerUIBundle({
                url: '/openapi.json',
                dom_id: '#swagger-ui',
                deepLinking: true
            });
        };
    </script>
</body>
</html>
        "#;

        Ok(Response::builder()
            .status(StatusCode::OK)
            .header("content-type", "text/html")
            .body(Full::new(Bytes::from(swagger_ui_html)))?)
    }

    /// Serve OpenAPI specification
    async fn serve_openapi_spec(&self) -> Result<Response<Full<Bytes>>, ApiError> {
        Ok(Response::builder()
            .status(StatusCode::OK)
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from(self.openapi_spec.clone())))?)
    }
}

/// Generate OpenAPI specification
fn generate_openapi_spec() -> String {
    #[derive(OpenApi)]
    #[openapi(
        paths(
            health::health_check,
            health::version_info,
            analyze::analyze,
        ),
        components(
            schemas(
                crate::models::AnalyzeRequest,
                crate::models::AnalyzeParams,
                crate::models::AnalyzeResponse,
                crate::models::HealthResponse,
                crate::models::ApiVersion,
            )
        ),
        tags(
            (name = "Health", description = "Health check and version endpoints"),
            (name = "Analysis", description = "Keyword research analysis operations")
        )
    )]
    struct ApiDoc;

    ApiDoc::openapi().to_pretty_json().unwrap_or_else(|_| "{}".to_string())
}
