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

//! Drives one engine operation under full control of its interactive I/O.

use crate::engine::{Engine, EngineFactory, Operation};
use crate::session::{ExportRecord, Session};
use anyhow::Result;
use std::path::Path;
use tracing::{debug, warn};

/// Everything captured from a single engine invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Verbatim text the engine printed, up to completion or failure.
    pub output: String,

    /// Exports recorded before completion or failure, in arrival order.
    pub exports: Vec<ExportRecord>,

    /// Failure of the invoked routine, downgraded to a message. `None`
    /// on success.
    pub error: Option<String>,
}

/// Execute exactly one analysis operation against a fresh engine.
///
/// A new [`Session`] is built from the answer queue and a new engine is
/// created through the factory, so consecutive or concurrent calls cannot
/// observe each other's interaction state. If the routine fails midway,
/// whatever output and exports it produced up to that point are returned
/// alongside the error message; partial progress is never discarded.
///
/// Returns `Err` only for adapter faults (the engine could not be
/// constructed); routine failures are reported inside the [`Invocation`].
pub fn run_operation(
    factory: &dyn EngineFactory,
    operation: Operation,
    answers: Vec<String>,
    data_dir: &Path,
) -> Result<Invocation> {
    let mut session = Session::new(answers, data_dir);
    let mut engine = factory.create()?;

    debug!(operation = operation.label(), "running analysis operation");
    let result = dispatch(engine.as_mut(), operation, &mut session);

    let (output, exports) = session.into_artifacts();
    let error = match result {
        Ok(()) => None,
        Err(e) => {
            warn!(operation = operation.label(), error = %e, "analysis operation failed");
            Some(format!("{e:#}"))
        }
    };

    Ok(Invocation { output, exports, error })
}

fn dispatch(engine: &mut (dyn Engine + Send), operation: Operation, session: &mut Session) -> Result<()> {
    match operation {
        Operation::SiteAnalysis => engine.run_site_analysis(session),
        Operation::NicheAnalysis => engine.run_niche_analysis(session),
        Operation::UrlAnalysis => engine.run_url_analysis(session),
        Operation::KeywordVariations => engine.run_keyword_variations(session),
        Operation::ThemeAnalysis => engine.run_theme_analysis(session),
        Operation::ContentPruning => engine.run_content_pruning(session),
        Operation::LearningDashboard => engine.show_learning_dashboard(session),
        Operation::LearningExport => engine.export_learning_data(session),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::fmt::Write;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Engine that records the answers it read and optionally fails after
    /// producing partial output and one export.
    struct ScriptedEngine {
        prompts: usize,
        fail_midway: bool,
        seen_answers: Arc<std::sync::Mutex<Vec<String>>>,
    }

    impl ScriptedEngine {
        fn run(&mut self, session: &mut Session) -> Result<()> {
            writeln!(session, "starting")?;
            for i in 0..self.prompts {
                let answer = session.read_answer("? ");
                self.seen_answers.lock().unwrap().push(answer);
                writeln!(session, "prompt {i} answered")?;
            }
            session.record_export("partial", vec![serde_json::json!({"row": 1})]);
            if self.fail_midway {
                bail!("engine exploded");
            }
            writeln!(session, "done")?;
            Ok(())
        }
    }

    impl Engine for ScriptedEngine {
        fn run_site_analysis(&mut self, session: &mut Session) -> Result<()> {
            self.run(session)
        }
        fn run_niche_analysis(&mut self, session: &mut Session) -> Result<()> {
            self.run(session)
        }
        fn run_url_analysis(&mut self, session: &mut Session) -> Result<()> {
            self.run(session)
        }
        fn run_keyword_variations(&mut self, session: &mut Session) -> Result<()> {
            self.run(session)
        }
        fn run_theme_analysis(&mut self, session: &mut Session) -> Result<()> {
            self.run(session)
        }
        fn run_content_pruning(&mut self, session: &mut Session) -> Result<()> {
            self.run(session)
        }
        fn show_learning_dashboard(&mut self, session: &mut Session) -> Result<()> {
            self.run(session)
        }
        fn export_learning_data(&mut self, session: &mut Session) -> Result<()> {
            self.run(session)
        }
    }

    struct ScriptedFactory {
        prompts: usize,
        fail_midway: bool,
        created: Arc<AtomicUsize>,
        seen_answers: Arc<std::sync::Mutex<Vec<String>>>,
    }

    impl ScriptedFactory {
        fn new(prompts: usize, fail_midway: bool) -> Self {
            Self {
                prompts,
                fail_midway,
                created: Arc::new(AtomicUsize::new(0)),
                seen_answers: Arc::new(std::sync::Mutex::new(Vec::new())),
            }
        }
    }

    impl EngineFactory for ScriptedFactory {
        fn create(&self) -> Result<Box<dyn Engine + Send>> {
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(ScriptedEngine {
                prompts: self.prompts,
                fail_midway: self.fail_midway,
                seen_answers: self.seen_answers.clone(),
            }))
        }
    }

    struct BrokenFactory;

    impl EngineFactory for BrokenFactory {
        fn create(&self) -> Result<Box<dyn Engine + Send>> {
            bail!("engine module missing")
        }
    }

    #[test]
    fn successful_invocation_returns_output_and_exports() {
        let factory = ScriptedFactory::new(1, false);
        let invocation =
            run_operation(&factory, Operation::NicheAnalysis, vec!["fitness".into()], Path::new("/tmp")).unwrap();

        assert!(invocation.error.is_none());
        assert!(invocation.output.contains("starting"));
        assert!(invocation.output.contains("done"));
        assert_eq!(invocation.exports.len(), 1);
        assert_eq!(factory.seen_answers.lock().unwrap().as_slice(), ["fitness"]);
    }

    #[test]
    fn failure_keeps_partial_output_and_exports() {
        let factory = ScriptedFactory::new(0, true);
        let invocation =
            run_operation(&factory, Operation::SiteAnalysis, Vec::new(), Path::new("/tmp")).unwrap();

        assert_eq!(invocation.error.as_deref(), Some("engine exploded"));
        assert!(invocation.output.contains("starting"));
        assert_eq!(invocation.exports.len(), 1);
        assert_eq!(invocation.exports[0].name, "partial");
    }

    #[test]
    fn short_answer_queue_yields_empty_answers() {
        let factory = ScriptedFactory::new(3, false);
        let invocation =
            run_operation(&factory, Operation::SiteAnalysis, vec!["https://a.com".into()], Path::new("/tmp"))
                .unwrap();

        assert!(invocation.error.is_none());
        assert_eq!(
            factory.seen_answers.lock().unwrap().as_slice(),
            ["https://a.com", "", ""]
        );
    }

    #[test]
    fn each_invocation_gets_a_fresh_engine() {
        let factory = ScriptedFactory::new(0, false);
        run_operation(&factory, Operation::LearningDashboard, Vec::new(), Path::new("/tmp")).unwrap();
        run_operation(&factory, Operation::LearningExport, Vec::new(), Path::new("/tmp")).unwrap();
        assert_eq!(factory.created.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn sequential_invocations_are_isolated() {
        let factory = ScriptedFactory::new(1, false);
        let first =
            run_operation(&factory, Operation::NicheAnalysis, vec!["first".into()], Path::new("/tmp")).unwrap();
        let second = run_operation(&factory, Operation::NicheAnalysis, Vec::new(), Path::new("/tmp")).unwrap();

        // The second call must not see the first call's answers or output.
        assert!(first.output.contains("starting"));
        assert!(!second.output.contains("first"));
        assert_eq!(factory.seen_answers.lock().unwrap().as_slice(), ["first", ""]);
    }

    #[test]
    fn factory_failure_is_an_adapter_fault() {
        let err = run_operation(&BrokenFactory, Operation::SiteAnalysis, Vec::new(), Path::new("/tmp"))
            .unwrap_err();
        assert!(err.to_string().contains("engine module missing"));
    }
}
