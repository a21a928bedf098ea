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

//! Analysis handler: the HTTP face of the interactive-script adapter.

use crate::error::ApiError;
use crate::models::{AnalyzeRequest, AnalyzeResponse, build_answer_queue};
use crate::router::AppState;
use http_body_util::{BodyExt, Full, Limited};
use hyper::{Request, Response, StatusCode, body::Bytes};
use kwplanner_core::{Invocation, run_operation};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Run one analysis operation
/// POST /api/v1/analyze
///
/// Validation failures are client faults (HTTP 400). A failure of the
/// invoked routine is not: the engine's partial output and exports are
/// returned with HTTP 200 and a non-null `error`, so the caller can
/// still read everything produced before the failure.
#[utoipa::path(
    post,
    path = "/api/v1/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Invocation completed (possibly with an engine error)", body = AnalyzeResponse),
        (status = 400, description = "Invalid selector or missing parameter"),
        (status = 413, description = "Request body exceeds the configured limit"),
        (status = 500, description = "Adapter fault")
    ),
    tag = "Analysis"
)]
pub async fn analyze(req: Request<hyper::body::Incoming>, state: AppState) -> Result<Response<Full<Bytes>>, ApiError> {
    info!("Processing analyze request");

    // Cap the buffered body; nothing legitimate comes close to the limit.
    let limit = state.config.max_body_bytes;
    let body = Limited::new(req.into_body(), limit as usize)
        .collect()
        .await
        .map_err(|_| ApiError::PayloadTooLarge { limit })?
        .to_bytes();
    let request: AnalyzeRequest = serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest {
        message: format!("invalid JSON body: {e}"),
    })?;

    // Reject before any engine is constructed.
    let (operation, answers) = build_answer_queue(request.option, &request.params)?;
    info!(operation = operation.label(), "dispatching analysis operation");

    let factory = Arc::clone(&state.factory);
    let data_dir = state.config.data_dir.clone();
    let timeout = Duration::from_secs(state.config.analysis_timeout_secs);

    // The engine is synchronous console-style code; run it off the
    // async runtime.
    let task = tokio::task::spawn_blocking(move || run_operation(factory.as_ref(), operation, answers, &data_dir));

    let invocation = match tokio::time::timeout(timeout, task).await {
        Ok(Ok(Ok(invocation))) => invocation,
        Ok(Ok(Err(e))) => {
            return Err(ApiError::InternalServerError {
                message: format!("failed to load analysis engine: {e:#}"),
            });
        }
        Ok(Err(e)) => {
            return Err(ApiError::InternalServerError {
                message: format!("analysis task failed: {e}"),
            });
        }
        Err(_) => {
            // The abandoned task owns its session; nothing process-wide
            // needs restoring, but its partial output is unreachable.
            warn!(operation = operation.label(), "analysis timed out");
            Invocation {
                output: String::new(),
                exports: Vec::new(),
                error: Some(format!(
                    "analysis timed out after {}s",
                    state.config.analysis_timeout_secs
                )),
            }
        }
    };

    if let Some(error) = &invocation.error {
        warn!(operation = operation.label(), error = %error, "analysis finished with engine error");
    }

    let response = AnalyzeResponse {
        output: invocation.output,
        exports: invocation.exports,
        error: invocation.error,
    };
    let response_json = serde_json::to_string(&response)?;

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(response_json)))?)
}
