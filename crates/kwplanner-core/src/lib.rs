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

//! Core adapter that drives a console-oriented analysis engine through a
//! stateless request/response cycle.
//!
//! The engine is written against [`Session`], an explicit interaction
//! context replacing the console: prompt answers are popped from an
//! in-memory queue, printed output accumulates in a buffer, and file
//! exports become in-memory [`ExportRecord`]s. Each invocation gets a
//! fresh session and a fresh engine instance, so nothing leaks between
//! unrelated calls.

pub mod adapter;
pub mod engine;
pub mod session;

pub use adapter::{Invocation, run_operation};
pub use engine::{Engine, EngineFactory, InvalidSelector, Operation};
pub use session::{ExportRecord, Session};
