//! Load/execute/save script envelope.

/// Placeholder replaced by the session state name in both templates.
pub const STATE_PLACEHOLDER: &str = "{state}";

const SAGE_PROLOGUE: &str = "# -*- coding: utf-8 -*-
try:
    load_session('{state}')
except:
    pass";

const SAGE_EPILOGUE: &str = "save_session('{state}')";

/// Prologue and epilogue templates wrapped around every unit's source.
///
/// The prologue must tolerate a missing or unreadable state (the first unit
/// of a run has nothing to load); the epilogue must save unconditionally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    prologue: String,
    epilogue: String,
}

impl Envelope {
    /// Builds an envelope from explicit templates.
    pub fn new(prologue: impl Into<String>, epilogue: impl Into<String>) -> Self {
        Self {
            prologue: prologue.into(),
            epilogue: epilogue.into(),
        }
    }

    /// The SageMath `load_session`/`save_session` envelope.
    pub fn sage() -> Self {
        Self::new(SAGE_PROLOGUE, SAGE_EPILOGUE)
    }

    /// Starts from the SageMath envelope and replaces whichever half is overridden.
    pub fn with_overrides(prologue: Option<&str>, epilogue: Option<&str>) -> Self {
        let base = Self::sage();
        Self {
            prologue: prologue.map(str::to_string).unwrap_or(base.prologue),
            epilogue: epilogue.map(str::to_string).unwrap_or(base.epilogue),
        }
    }

    /// Produces the script text for `source` threaded through state `state`.
    ///
    /// The source is embedded verbatim between the rendered prologue and
    /// epilogue, each part terminated by a newline.
    pub fn wrap(&self, state: &str, source: &str) -> String {
        let prologue = self.prologue.replace(STATE_PLACEHOLDER, state);
        let epilogue = self.epilogue.replace(STATE_PLACEHOLDER, state);
        let mut script = String::with_capacity(prologue.len() + source.len() + epilogue.len() + 3);
        script.push_str(&prologue);
        script.push('\n');
        script.push_str(source);
        script.push('\n');
        script.push_str(&epilogue);
        script.push('\n');
        script
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::sage()
    }
}
