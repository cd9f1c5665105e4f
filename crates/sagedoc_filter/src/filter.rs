//! The filter run: session, cache, tools, and failure policy together.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use sagedoc_cache::ArtifactStore;
use sagedoc_config::{FailurePolicy, FilterConfig};
use sagedoc_engine::{ExecutionResult, ExternalTools, ProcessRunner, Toolchain};
use sagedoc_pandoc::{BlockAction, CodeBlock, Document, InlineText, Visitor};
use sagedoc_session::SessionContext;

use crate::error::FilterError;
use crate::inline;
use crate::report::{Diagnostic, Report};
use crate::unit::ComputationUnit;

/// Rewrites the computation nodes of a document, one at a time, in order.
pub struct Filter {
    store: ArtifactStore,
    session: SessionContext,
    tools: Box<dyn ExternalTools>,
    policy: FailurePolicy,
    report: Report,
}

impl Filter {
    /// Assembles a filter from its parts with the best-effort policy.
    pub fn new(store: ArtifactStore, session: SessionContext, tools: Box<dyn ExternalTools>) -> Self {
        Self {
            store,
            session,
            tools,
            policy: FailurePolicy::default(),
            report: Report::new(),
        }
    }

    /// Builds the real toolchain from configuration. Ctrl-C cancels the
    /// running child and stops the run.
    pub fn from_config(config: &FilterConfig) -> Result<Self, FilterError> {
        let runner = ProcessRunner::new()?
            .with_timeout(config.engine.timeout())
            .cancel_on_interrupt(true);
        let tools = Toolchain::new(config, runner);
        Ok(Self::new(
            ArtifactStore::new(config.cache.dir.clone()),
            SessionContext::from_config(&config.session),
            Box::new(tools),
        )
        .with_policy(config.filter.on_error))
    }

    /// Sets what happens when a node fails.
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The active failure policy.
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// The artifact cache.
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// The session state owner.
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub(crate) fn tools(&self) -> &dyn ExternalTools {
        self.tools.as_ref()
    }

    /// What has happened so far.
    pub fn report(&self) -> &Report {
        &self.report
    }

    /// Consumes the filter, returning its report.
    pub fn into_report(self) -> Report {
        self.report
    }

    /// Resets the session and rewrites `document` in place.
    pub fn run(&mut self, document: &mut Document) -> Result<(), FilterError> {
        self.session.start()?;
        document.walk(self)?;
        debug!("{}", self.report.summary());
        Ok(())
    }

    /// Runs one unit through the script cache, the session envelope and the
    /// engine.
    ///
    /// Session state is captured after every run, including failed ones.
    pub fn execute(&mut self, unit: &ComputationUnit) -> Result<ExecutionResult, FilterError> {
        let session = &self.session;
        let script = self
            .store
            .prepare_script(unit.source(), |source| session.wrap(source))?;
        debug!("running {} unit {}", unit.kind(), script.display());

        self.session.before_run()?;
        self.report.note_execution();
        let result = self.tools.run_script(&script, self.session.work_dir());
        let captured = self.session.after_run();
        let result = result?;
        captured?;
        Ok(result)
    }

    /// Replaces every inline directive in `text` with its output.
    pub fn substitute(&mut self, text: &str) -> Result<String, FilterError> {
        let outcome = inline::substitute_with(text, |command| {
            let unit = ComputationUnit::inline(command);
            match self.execute(&unit) {
                Ok(result) => Ok(Some(result.stdout)),
                Err(err) => self.degrade(&unit, err, None),
            }
        })?;
        self.report.note_unresolved(outcome.unresolved);
        Ok(outcome.text)
    }

    /// Where the engine should write `path`. Relative paths are kept when
    /// the engine shares our working directory.
    pub(crate) fn engine_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() || self.session.work_dir() == Path::new(".") {
            return path.to_path_buf();
        }
        std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
    }

    /// Applies the failure policy: returns `fallback` after recording a
    /// diagnostic, or hands the error back when the run must stop.
    pub(crate) fn degrade<T>(
        &mut self,
        unit: &ComputationUnit,
        err: FilterError,
        fallback: T,
    ) -> Result<T, FilterError> {
        if self.policy == FailurePolicy::Abort || err.is_fatal() {
            return Err(err);
        }
        let diagnostic = Diagnostic::new(unit, &err);
        warn!("{diagnostic}");
        self.report.record(diagnostic);
        Ok(fallback)
    }
}

impl Visitor for Filter {
    type Error = FilterError;

    fn visit_code_block(&mut self, block: &CodeBlock) -> Result<BlockAction, FilterError> {
        self.process_block(block)
    }

    fn visit_inline(&mut self, inline: &InlineText) -> Result<Option<InlineText>, FilterError> {
        let text = inline.text();
        let replaced = self.substitute(text)?;
        if replaced == text {
            return Ok(None);
        }
        Ok(Some(inline.with_text(replaced)))
    }
}

impl std::fmt::Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filter")
            .field("store", &self.store)
            .field("session", &self.session)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fake_filter, Call};
    use sagedoc_engine::EngineError;
    use serde_json::json;

    #[test]
    fn execute_wraps_source_in_envelope() {
        let (_tmp, mut filter, calls) = fake_filter(|_| Ok("1\n".to_string()));
        let unit = ComputationUnit::inline("print(1)");
        let result = filter.execute(&unit).unwrap();
        assert_eq!(result.stdout, "1\n");
        assert_eq!(
            calls.borrow().as_slice(),
            &[Call::Run("# load sage_session\nprint(1)\n# save sage_session\n".to_string())]
        );
        assert_eq!(filter.report().executions(), 1);
    }

    #[test]
    fn execute_reuses_cached_script() {
        let (_tmp, mut filter, calls) = fake_filter(|_| Ok(String::new()));
        let unit = ComputationUnit::inline("print(1)");
        filter.execute(&unit).unwrap();
        let script = filter.store().script_path("print(1)");
        std::fs::write(&script, "edited by hand\n").unwrap();
        filter.execute(&unit).unwrap();
        assert_eq!(calls.borrow()[1], Call::Run("edited by hand\n".to_string()));
    }

    #[test]
    fn substitute_leaves_plain_text_alone() {
        let (_tmp, mut filter, calls) = fake_filter(|_| Ok("x".to_string()));
        assert_eq!(filter.substitute("no directive here").unwrap(), "no directive here");
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn substitute_runs_each_directive_form() {
        let (_tmp, mut filter, _calls) = fake_filter(|script| {
            Ok(if script.contains("print(latex(a))") {
                "\\alpha\n".to_string()
            } else if script.contains("print(latex(b))") {
                "\\beta\n".to_string()
            } else if script.contains("print(3)") {
                "3\n".to_string()
            } else {
                panic!("unexpected script {script}")
            })
        });
        let out = filter
            .substitute(r"\sage{a} + \sage{latex(b)} = \sage{print(3)}")
            .unwrap();
        assert_eq!(out, r"\alpha + \beta = 3");
    }

    #[test]
    fn failed_directive_stays_in_place() {
        let (_tmp, mut filter, _calls) = fake_filter(|script| {
            if script.contains("oops") {
                Err(EngineError::EngineFailure {
                    program: "sage".to_string(),
                    code: Some(1),
                    stderr: "NameError".to_string(),
                })
            } else {
                Ok("2".to_string())
            }
        });
        let out = filter.substitute(r"$\sage{oops}$ and $\sage{1+1}$").unwrap();
        assert_eq!(out, r"$\sage{oops}$ and $2$");
        assert_eq!(filter.report().failure_count(), 1);
        assert_eq!(filter.report().unresolved(), 1);
    }

    #[test]
    fn cancellation_stops_even_best_effort() {
        let (_tmp, mut filter, _calls) = fake_filter(|_| {
            Err(EngineError::Cancelled {
                program: "sage".to_string(),
            })
        });
        let err = filter.substitute(r"\sage{1}").unwrap_err();
        assert!(err.is_fatal());
        assert!(!filter.report().has_failures());
    }

    #[test]
    fn run_rewrites_document_in_order() {
        let (_tmp, mut filter, calls) = fake_filter(|script| {
            Ok(if script.contains("print(latex(n))") {
                "7".to_string()
            } else {
                String::new()
            })
        });
        let mut doc = Document::from_value(json!({
            "pandoc-api-version": [1, 23, 1],
            "meta": {},
            "blocks": [
                { "t": "CodeBlock", "c": [["", ["sagesilent"], []], "n = 7"] },
                { "t": "Para", "c": [
                    { "t": "Str", "c": "n" },
                    { "t": "Math", "c": [{ "t": "InlineMath" }, "= \\sage{n}"] }
                ]},
                { "t": "CodeBlock", "c": [["", ["rust"], []], "fn main() {}"] }
            ]
        }))
        .unwrap();
        filter.run(&mut doc).unwrap();

        let blocks = doc.blocks();
        assert_eq!(blocks[0], crate::dispatch::empty_fragment());
        assert_eq!(
            blocks[1]["c"][1],
            json!({ "t": "Math", "c": [{ "t": "InlineMath" }, "= 7"] })
        );
        assert_eq!(blocks[2]["c"][1], "fn main() {}");
        let calls = calls.borrow();
        assert_eq!(calls.len(), 2);
        assert!(matches!(&calls[0], Call::Run(s) if s.contains("n = 7")));
    }

    #[test]
    fn relative_paths_made_absolute_for_other_work_dirs() {
        let (tmp, filter, _calls) = fake_filter(|_| Ok(String::new()));
        assert_eq!(filter.session().work_dir(), tmp.path());
        let path = filter.engine_path(Path::new("sage-images/a.svg"));
        assert!(path.is_absolute());
        assert!(path.ends_with("sage-images/a.svg"));
    }
}
