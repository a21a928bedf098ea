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

//! Per-invocation interaction context for the analysis engine.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};

/// In-memory stand-in for a file the engine would otherwise write to disk.
///
/// The payload is returned to the caller verbatim; the adapter never
/// touches the filesystem on the engine's behalf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    /// Name the engine would have used for the file.
    pub name: String,

    /// Rows of the would-be file, as JSON values.
    pub payload: Vec<serde_json::Value>,
}

/// Interaction context handed to the engine for exactly one invocation.
///
/// Replaces the console the engine was written for: prompt answers come
/// from an ordered queue, output accumulates in a buffer (the engine
/// writes through [`std::fmt::Write`]), supporting files resolve against
/// a fixed data directory, and exports are recorded in memory in arrival
/// order. The session is constructed fresh per request and consumed when
/// the invocation ends, so no interaction state survives a call.
pub struct Session {
    answers: VecDeque<String>,
    output: String,
    exports: Vec<ExportRecord>,
    data_dir: PathBuf,
}

impl Session {
    /// Create a session holding the ordered answers for this invocation.
    pub fn new(answers: Vec<String>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            answers: answers.into(),
            output: String::new(),
            exports: Vec::new(),
            data_dir: data_dir.into(),
        }
    }

    /// Answer the next console prompt.
    ///
    /// Answers are consumed front-to-back and whitespace-trimmed. Once the
    /// queue is exhausted every further prompt receives an empty string
    /// rather than failing. The prompt text is not echoed into the output
    /// buffer; engines print their own banners.
    pub fn read_answer(&mut self, _prompt: &str) -> String {
        match self.answers.pop_front() {
            Some(answer) => answer.trim().to_string(),
            None => String::new(),
        }
    }

    /// Number of answers still queued.
    pub fn remaining_answers(&self) -> usize {
        self.answers.len()
    }

    /// Resolve a supporting file (e.g. the learning store) inside the
    /// data directory the engine expects to work in.
    pub fn data_path(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(file_name)
    }

    /// Directory holding the engine's supporting files.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Record a file export instead of writing it to disk.
    pub fn record_export(&mut self, name: impl Into<String>, payload: Vec<serde_json::Value>) {
        self.exports.push(ExportRecord { name: name.into(), payload });
    }

    /// Everything the engine has printed so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Exports recorded so far, in arrival order.
    pub fn exports(&self) -> &[ExportRecord] {
        &self.exports
    }

    /// Tear the session down into its captured artifacts.
    pub fn into_artifacts(self) -> (String, Vec<ExportRecord>) {
        (self.output, self.exports)
    }
}

impl fmt::Write for Session {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.output.push_str(s);
        Ok(())
    }
}
