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

//! The analysis engine seam: operation selectors and the engine traits.

use crate::session::Session;
use anyhow::Result;
use thiserror::Error;

/// Selector outside the supported `1..=8` range.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("option must be between 1 and 8, got {0}")]
pub struct InvalidSelector(pub i64);

/// The analysis routines the engine supports, numbered 1 through 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SiteAnalysis,
    NicheAnalysis,
    UrlAnalysis,
    KeywordVariations,
    ThemeAnalysis,
    ContentPruning,
    LearningDashboard,
    LearningExport,
}

impl Operation {
    pub const ALL: [Operation; 8] = [
        Operation::SiteAnalysis,
        Operation::NicheAnalysis,
        Operation::UrlAnalysis,
        Operation::KeywordVariations,
        Operation::ThemeAnalysis,
        Operation::ContentPruning,
        Operation::LearningDashboard,
        Operation::LearningExport,
    ];

    /// The wire-level selector for this operation.
    pub fn selector(self) -> u8 {
        match self {
            Operation::SiteAnalysis => 1,
            Operation::NicheAnalysis => 2,
            Operation::UrlAnalysis => 3,
            Operation::KeywordVariations => 4,
            Operation::ThemeAnalysis => 5,
            Operation::ContentPruning => 6,
            Operation::LearningDashboard => 7,
            Operation::LearningExport => 8,
        }
    }

    /// Human-readable name used in logs and output.
    pub fn label(self) -> &'static str {
        match self {
            Operation::SiteAnalysis => "site analysis",
            Operation::NicheAnalysis => "niche analysis",
            Operation::UrlAnalysis => "url analysis",
            Operation::KeywordVariations => "keyword variations",
            Operation::ThemeAnalysis => "theme analysis",
            Operation::ContentPruning => "content pruning",
            Operation::LearningDashboard => "learning dashboard",
            Operation::LearningExport => "learning export",
        }
    }
}

impl TryFrom<i64> for Operation {
    type Error = InvalidSelector;

    fn try_from(selector: i64) -> Result<Self, InvalidSelector> {
        match selector {
            1 => Ok(Operation::SiteAnalysis),
            2 => Ok(Operation::NicheAnalysis),
            3 => Ok(Operation::UrlAnalysis),
            4 => Ok(Operation::KeywordVariations),
            5 => Ok(Operation::ThemeAnalysis),
            6 => Ok(Operation::ContentPruning),
            7 => Ok(Operation::LearningDashboard),
            8 => Ok(Operation::LearningExport),
            other => Err(InvalidSelector(other)),
        }
    }
}

/// One analysis engine instance, valid for a single invocation.
///
/// Every routine interacts with the caller exclusively through the
/// [`Session`] it receives: answers, output, data-file paths and exports
/// all go through the context, never through process-wide state. A
/// routine may still perform real side effects of its own (network
/// calls, mutating the learning store); only the console surface is
/// intercepted.
pub trait Engine {
    fn run_site_analysis(&mut self, session: &mut Session) -> Result<()>;
    fn run_niche_analysis(&mut self, session: &mut Session) -> Result<()>;
    fn run_url_analysis(&mut self, session: &mut Session) -> Result<()>;
    fn run_keyword_variations(&mut self, session: &mut Session) -> Result<()>;
    fn run_theme_analysis(&mut self, session: &mut Session) -> Result<()>;
    fn run_content_pruning(&mut self, session: &mut Session) -> Result<()>;
    fn show_learning_dashboard(&mut self, session: &mut Session) -> Result<()>;
    fn export_learning_data(&mut self, session: &mut Session) -> Result<()>;
}

/// Builds a fresh [`Engine`] per invocation.
///
/// Fresh construction is a correctness requirement, not an optimization:
/// it guarantees no engine state is shared between unrelated requests.
/// A construction failure is an adapter fault (the engine could not be
/// loaded), distinct from a failure of the invoked routine.
pub trait EngineFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn Engine + Send>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_round_trip() {
        for op in Operation::ALL {
            assert_eq!(Operation::try_from(op.selector() as i64), Ok(op));
        }
    }

    #[test]
    fn out_of_range_selectors_are_rejected() {
        for selector in [0i64, 9, -1, 100] {
            let err = Operation::try_from(selector).unwrap_err();
            assert_eq!(err, InvalidSelector(selector));
            assert!(err.to_string().contains(&selector.to_string()));
        }
    }
}
