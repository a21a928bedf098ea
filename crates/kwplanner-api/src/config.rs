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

//! Configuration management for the API

use std::env;
use std::path::PathBuf;

const DEFAULT_ANALYSIS_TIMEOUT_SECS: u64 = 600;
const DEFAULT_MAX_BODY_BYTES: u64 = 64 * 1024;

/// Configuration for the API server
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the HTTP server to
    pub bind_address: String,

    /// Directory holding the engine's supporting files (learning store)
    pub data_dir: PathBuf,

    /// Upper bound on one analysis invocation, in seconds
    pub analysis_timeout_secs: u64,

    /// Upper bound on a request body, in bytes
    pub max_body_bytes: u64,

    /// Enable CORS for web clients
    pub cors_enabled: bool,

    /// Allowed CORS origins
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
            data_dir: PathBuf::from("data"),
            analysis_timeout_secs: DEFAULT_ANALYSIS_TIMEOUT_SECS,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            cors_enabled: true,
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            bind_address: env::var("KWPLANNER_BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:5000".to_string()),

            data_dir: env::var("KWPLANNER_DATA_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("data")),

            analysis_timeout_secs: env::var("KWPLANNER_ANALYSIS_TIMEOUT_SECS")
                .map(|v| v.parse().unwrap_or(DEFAULT_ANALYSIS_TIMEOUT_SECS))
                .unwrap_or(DEFAULT_ANALYSIS_TIMEOUT_SECS),

            max_body_bytes: env::var("KWPLANNER_MAX_BODY_BYTES")
                .map(|v| v.parse().unwrap_or(DEFAULT_MAX_BODY_BYTES))
                .unwrap_or(DEFAULT_MAX_BODY_BYTES),

            cors_enabled: env::var("KWPLANNER_CORS_ENABLED").map(|v| v.parse().unwrap_or(true)).unwrap_or(true),

            cors_origins: env::var("KWPLANNER_CORS_ORIGINS")
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["*".to_string()]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_original_deployment() {
        let config = Config::default();
        assert_eq!(config.bind_address, "0.0.0.0:5000");
        assert_eq!(config.analysis_timeout_secs, 600);
        assert_eq!(config.max_body_bytes, 64 * 1024);
        assert!(config.cors_enabled);
    }
}
