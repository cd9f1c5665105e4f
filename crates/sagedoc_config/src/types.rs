//! Configuration types deserialized from `sagedoc.toml`.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// The top-level filter configuration parsed from `sagedoc.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Computation engine settings.
    pub engine: EngineConfig,
    /// Typesetting toolchain used for `latex` blocks.
    pub typeset: TypesetConfig,
    /// Markup converter used to re-parse visible block output.
    pub convert: ConvertConfig,
    /// Artifact cache location.
    pub cache: CacheConfig,
    /// Session-state threading settings.
    pub session: SessionConfig,
    /// Error handling policy.
    pub filter: PolicyConfig,
}

/// Settings for the computation engine subprocess.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Engine binary, invoked as `<program> <script>`.
    pub program: String,
    /// Per-invocation time limit in seconds. Absent means no limit.
    pub timeout_secs: Option<u64>,
}

impl EngineConfig {
    /// Returns the configured time limit, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: "sage".to_string(),
            timeout_secs: None,
        }
    }
}

/// Settings for the TeX-to-SVG toolchain.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypesetConfig {
    /// TeX compiler, invoked as `<compiler> -output-directory <dir> <tex>`.
    pub compiler: String,
    /// PDF converter, invoked as `<converter> -svg <pdf> <svg>`.
    pub converter: String,
}

impl Default for TypesetConfig {
    fn default() -> Self {
        Self {
            compiler: "pdflatex".to_string(),
            converter: "pdftocairo".to_string(),
        }
    }
}

/// Settings for the markup converter.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    /// Converter binary, invoked as `<program> --from <from> --to json`.
    pub program: String,
    /// Input format of engine output in `sageblock` blocks.
    pub from: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            program: "pandoc".to_string(),
            from: "markdown".to_string(),
        }
    }
}

/// Artifact cache settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Directory holding `<hash>.<ext>` artifacts, relative to the working directory.
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("sage-images"),
        }
    }
}

/// Session-state threading settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// State name passed to the engine's load/save calls.
    pub name: String,
    /// Suffix the engine appends when saving state.
    pub suffix: String,
    /// Where state lives between engine invocations.
    pub persistence: Persistence,
    /// Working directory for engine invocations.
    pub work_dir: PathBuf,
    /// Override of the envelope prologue. Must contain `{state}`.
    pub prologue: Option<String>,
    /// Override of the envelope epilogue. Must contain `{state}`.
    pub epilogue: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: "sage_session".to_string(),
            suffix: ".sobj".to_string(),
            persistence: Persistence::File,
            work_dir: PathBuf::from("."),
            prologue: None,
            epilogue: None,
        }
    }
}

/// Persistence strategy for session state.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Persistence {
    /// The state file in the working directory is the state (default).
    #[default]
    File,
    /// State is held in memory between invocations.
    Memory,
}

/// Error handling policy settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// What to do when a node cannot be computed.
    pub on_error: FailurePolicy,
}

/// What the filter does when a node's computation fails.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Degrade the failing node, record a diagnostic, and keep going (default).
    #[default]
    BestEffort,
    /// Stop at the first failure and emit no document.
    Abort,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    #[test]
    fn defaults_match_stock_toolchain() {
        let config = FilterConfig::default();
        assert_eq!(config.engine.program, "sage");
        assert!(config.engine.timeout().is_none());
        assert_eq!(config.typeset.compiler, "pdflatex");
        assert_eq!(config.typeset.converter, "pdftocairo");
        assert_eq!(config.convert.program, "pandoc");
        assert_eq!(config.convert.from, "markdown");
        assert_eq!(config.cache.dir, PathBuf::from("sage-images"));
        assert_eq!(config.session.name, "sage_session");
        assert_eq!(config.session.suffix, ".sobj");
        assert_eq!(config.session.persistence, Persistence::File);
        assert_eq!(config.filter.on_error, FailurePolicy::BestEffort);
    }

    #[test]
    fn persistence_all_variants() {
        for (input, expected) in [("file", Persistence::File), ("memory", Persistence::Memory)] {
            let toml = format!("[session]\npersistence = \"{input}\"\n");
            let config = load_config_from_str(&toml).unwrap();
            assert_eq!(config.session.persistence, expected);
        }
    }

    #[test]
    fn failure_policy_all_variants() {
        for (input, expected) in [
            ("best-effort", FailurePolicy::BestEffort),
            ("abort", FailurePolicy::Abort),
        ] {
            let toml = format!("[filter]\non_error = \"{input}\"\n");
            let config = load_config_from_str(&toml).unwrap();
            assert_eq!(config.filter.on_error, expected);
        }
    }

    #[test]
    fn timeout_converts_to_duration() {
        let config = load_config_from_str("[engine]\ntimeout_secs = 30\n").unwrap();
        assert_eq!(config.engine.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.engine.program, "sage");
    }
}
