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

//! KW Planner HTTP API
//!
//! Exposes the console-oriented keyword-research engine as HTTP
//! endpoints through the interactive-script adapter in
//! `kwplanner-core`: request parameters become an ordered answer queue,
//! console output becomes a response field, and file exports become
//! in-memory records.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod server;
