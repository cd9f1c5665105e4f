//! Recording stand-in for the external toolchain.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use sagedoc_cache::ArtifactStore;
use sagedoc_engine::{EngineError, ExecutionResult, ExternalTools};
use sagedoc_session::{Envelope, SessionContext};
use serde_json::{json, Value};

use crate::filter::Filter;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Call {
    /// Script contents at the time of the run.
    Run(String),
    Typeset(PathBuf),
    Convert(String),
}

pub(crate) type Calls = Rc<RefCell<Vec<Call>>>;

type Respond = Box<dyn Fn(&str) -> Result<String, EngineError>>;

struct FakeTools {
    calls: Calls,
    respond: Respond,
}

impl ExternalTools for FakeTools {
    fn run_script(&self, script: &Path, _work_dir: &Path) -> Result<ExecutionResult, EngineError> {
        let text = std::fs::read_to_string(script).map_err(|e| EngineError::Io {
            program: "fake".to_string(),
            source: e,
        })?;
        self.calls.borrow_mut().push(Call::Run(text.clone()));
        let stdout = (self.respond)(&text)?;
        Ok(ExecutionResult {
            stdout,
            stderr: String::new(),
            code: Some(0),
        })
    }

    fn typeset(&self, tex: &Path) -> Result<PathBuf, EngineError> {
        self.calls.borrow_mut().push(Call::Typeset(tex.to_path_buf()));
        Ok(tex.with_extension("svg"))
    }

    fn convert(&self, markup: &str) -> Result<Vec<Value>, EngineError> {
        self.calls.borrow_mut().push(Call::Convert(markup.to_string()));
        Ok(vec![json!({ "t": "Para", "c": [{ "t": "Str", "c": markup.trim() }] })])
    }
}

/// A filter over a temporary directory whose engine answers with `respond`.
pub(crate) fn fake_filter<F>(respond: F) -> (tempfile::TempDir, Filter, Calls)
where
    F: Fn(&str) -> Result<String, EngineError> + 'static,
{
    let tmp = tempfile::tempdir().unwrap();
    let calls = Calls::default();
    let tools = FakeTools {
        calls: Rc::clone(&calls),
        respond: Box::new(respond),
    };
    let session = SessionContext::new("sage_session", tmp.path())
        .with_envelope(Envelope::new("# load {state}", "# save {state}"));
    let store = ArtifactStore::new(tmp.path().join("sage-images"));
    let filter = Filter::new(store, session, Box::new(tools));
    (tmp, filter, calls)
}
