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

//! Keyword-research analysis engine.
//!
//! Implements the eight analysis routines behind the
//! [`kwplanner_core::Engine`] seam: keyword extraction from fetched
//! pages, niche seed generation, keyword variations, theme filtering,
//! content pruning heuristics, and a persisted learning store with a
//! dashboard and export.

pub mod engine;
pub mod fetch;
pub mod store;
pub mod text;
pub mod variations;

pub use engine::{KeywordEngine, KeywordEngineFactory};
