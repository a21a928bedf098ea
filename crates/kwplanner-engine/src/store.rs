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

//! Persisted learning store for keywords seen across analyses.
//!
//! A JSON file in the engine's data directory, shared by all requests
//! and mutated directly by the engine. Access is not coordinated across
//! concurrent writers; that is a deployment concern, not this store's.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// File name of the learning store inside the data directory.
pub const LEARNING_STORE_FILE: &str = "keyword_learning.json";

const MAX_SOURCES_PER_KEYWORD: usize = 10;

/// Accumulated knowledge about one keyword.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordStats {
    /// How many analyses surfaced this keyword.
    pub hits: u64,

    /// Best score the keyword reached in any analysis.
    pub best_score: f64,

    /// Where the keyword was seen (operation label or URL).
    pub sources: Vec<String>,

    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

/// The on-disk learning database.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LearningStore {
    keywords: BTreeMap<String, KeywordStats>,
}

impl LearningStore {
    /// Load the store from `path`; a missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("corrupt learning store at {}", path.display()))
    }

    /// Persist the store to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Record one sighting of a keyword.
    pub fn record(&mut self, keyword: &str, score: f64, source: &str) {
        let now = Utc::now();
        let stats = self.keywords.entry(keyword.to_lowercase()).or_insert_with(|| KeywordStats {
            hits: 0,
            best_score: 0.0,
            sources: Vec::new(),
            first_seen: now,
            last_seen: now,
        });
        stats.hits += 1;
        stats.last_seen = now;
        if score > stats.best_score {
            stats.best_score = score;
        }
        if !stats.sources.iter().any(|s| s == source) && stats.sources.len() < MAX_SOURCES_PER_KEYWORD {
            stats.sources.push(source.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Total sightings across all keywords.
    pub fn total_hits(&self) -> u64 {
        self.keywords.values().map(|s| s.hits).sum()
    }

    /// Keywords ranked by hits, then best score.
    pub fn top(&self, n: usize) -> Vec<(&str, &KeywordStats)> {
        let mut entries: Vec<_> = self.keywords.iter().map(|(k, v)| (k.as_str(), v)).collect();
        entries.sort_by(|a, b| {
            b.1.hits.cmp(&a.1.hits).then_with(|| {
                b.1.best_score
                    .partial_cmp(&a.1.best_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        });
        entries.truncate(n);
        entries
    }

    /// The whole store as export rows.
    pub fn to_export_payload(&self) -> Vec<serde_json::Value> {
        self.keywords
            .iter()
            .map(|(keyword, stats)| {
                serde_json::json!({
                    "keyword": keyword,
                    "hits": stats.hits,
                    "best_score": stats.best_score,
                    "sources": stats.sources,
                    "first_seen": stats.first_seen,
                    "last_seen": stats.last_seen,
                })
            })
            .collect()
    }
}
