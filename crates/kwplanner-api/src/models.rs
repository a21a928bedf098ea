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

//! Request/response models and answer-queue derivation.

use crate::error::ApiError;
use kwplanner_core::{ExportRecord, Operation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /api/v1/analyze`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    /// Operation selector, 1 through 8
    pub option: i64,

    /// Operation parameters; which keys are required depends on `option`
    #[serde(default)]
    pub params: AnalyzeParams,
}

/// Named parameters for an analysis operation.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AnalyzeParams {
    pub domain_url: Option<String>,
    pub include_subdomains: Option<bool>,
    pub niche: Option<String>,
    pub url: Option<String>,
    pub keyword: Option<String>,
    pub theme: Option<String>,
}

/// Result of one analysis invocation.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyzeResponse {
    /// Everything the engine printed, verbatim
    pub output: String,

    /// In-memory file exports produced by the engine
    #[schema(value_type = Vec<Object>)]
    pub exports: Vec<ExportRecord>,

    /// Failure of the invoked routine, if any. Reported with HTTP 200 so
    /// the caller can still read the partial output.
    pub error: Option<String>,
}

/// Health probe payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// API version information
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiVersion {
    pub version: String,
    pub build: String,
    pub features: Vec<String>,
}

/// Translate validated request parameters into the ordered list of
/// console answers the selected operation expects to read.
///
/// The adapter itself never validates prompt counts; this is the one
/// place where the per-operation parameter contract is enforced, before
/// any engine is constructed.
pub fn build_answer_queue(option: i64, params: &AnalyzeParams) -> Result<(Operation, Vec<String>), ApiError> {
    let operation = Operation::try_from(option).map_err(|e| ApiError::BadRequest { message: e.to_string() })?;

    let answers = match operation {
        Operation::SiteAnalysis | Operation::ContentPruning => {
            let domain_url = required(&params.domain_url, "domain_url")?;
            vec![ensure_scheme(&domain_url), subdomain_answer(params.include_subdomains)]
        }
        Operation::NicheAnalysis => vec![required(&params.niche, "niche")?],
        Operation::UrlAnalysis => {
            let url = required(&params.url, "url")?;
            vec![ensure_scheme(&url)]
        }
        Operation::KeywordVariations => vec![required(&params.keyword, "keyword")?],
        Operation::ThemeAnalysis => {
            let (Some(domain_url), Some(theme)) = (non_empty(&params.domain_url), non_empty(&params.theme)) else {
                return Err(ApiError::BadRequest {
                    message: "domain_url and theme are required".to_string(),
                });
            };
            vec![ensure_scheme(&domain_url), theme]
        }
        Operation::LearningDashboard | Operation::LearningExport => Vec::new(),
    };

    Ok((operation, answers))
}

/// Default to `https://` when no scheme is given.
pub fn ensure_scheme(raw: &str) -> String {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    }
}

fn subdomain_answer(include_subdomains: Option<bool>) -> String {
    let answer = if include_subdomains.unwrap_or(false) { "s" } else { "n" };
    answer.to_string()
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}

fn required(value: &Option<String>, name: &str) -> Result<String, ApiError> {
    non_empty(value).ok_or_else(|| ApiError::BadRequest {
        message: format!("{name} is required"),
    })
}
