//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::FilterConfig;
use std::path::Path;

/// Name of the configuration file looked up in a document directory.
pub const CONFIG_FILE: &str = "sagedoc.toml";

/// Placeholder the envelope templates substitute with the session state name.
const STATE_PLACEHOLDER: &str = "{state}";

/// Loads `<dir>/sagedoc.toml`, falling back to defaults when it does not exist.
pub fn load_config(dir: &Path) -> Result<FilterConfig, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.is_file() {
        return Ok(FilterConfig::default());
    }
    load_config_file(&config_path)
}

/// Loads and validates an explicit configuration file. The file must exist.
pub fn load_config_file(path: &Path) -> Result<FilterConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<FilterConfig, ConfigError> {
    let config: FilterConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required values are present and templates are usable.
pub fn validate_config(config: &FilterConfig) -> Result<(), ConfigError> {
    let required = [
        ("engine.program", config.engine.program.as_str()),
        ("typeset.compiler", config.typeset.compiler.as_str()),
        ("typeset.converter", config.typeset.converter.as_str()),
        ("convert.program", config.convert.program.as_str()),
        ("convert.from", config.convert.from.as_str()),
        ("session.name", config.session.name.as_str()),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(field.to_string()));
        }
    }
    if config.cache.dir.as_os_str().is_empty() {
        return Err(ConfigError::MissingField("cache.dir".to_string()));
    }
    if config.engine.timeout_secs == Some(0) {
        return Err(ConfigError::ValidationError(
            "engine.timeout_secs must be greater than zero".to_string(),
        ));
    }
    for (field, template) in [
        ("session.prologue", &config.session.prologue),
        ("session.epilogue", &config.session.epilogue),
    ] {
        if let Some(template) = template {
            if !template.contains(STATE_PLACEHOLDER) {
                return Err(ConfigError::ValidationError(format!(
                    "{field} must reference {STATE_PLACEHOLDER}"
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FailurePolicy, Persistence};
    use std::path::PathBuf;

    #[test]
    fn empty_config_is_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.engine.program, "sage");
        assert_eq!(config.cache.dir, PathBuf::from("sage-images"));
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[engine]
program = "/opt/sage/sage"
timeout_secs = 120

[typeset]
compiler = "lualatex"
converter = "pdf2svg"

[convert]
program = "/usr/local/bin/pandoc"
from = "commonmark"

[cache]
dir = "build/sage"

[session]
name = "thesis"
suffix = ".state"
persistence = "memory"
work_dir = "build"
prologue = "load('{state}')"
epilogue = "save('{state}')"

[filter]
on_error = "abort"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.engine.program, "/opt/sage/sage");
        assert_eq!(config.engine.timeout_secs, Some(120));
        assert_eq!(config.typeset.compiler, "lualatex");
        assert_eq!(config.typeset.converter, "pdf2svg");
        assert_eq!(config.convert.from, "commonmark");
        assert_eq!(config.cache.dir, PathBuf::from("build/sage"));
        assert_eq!(config.session.name, "thesis");
        assert_eq!(config.session.suffix, ".state");
        assert_eq!(config.session.persistence, Persistence::Memory);
        assert_eq!(config.session.work_dir, PathBuf::from("build"));
        assert_eq!(config.session.prologue.as_deref(), Some("load('{state}')"));
        assert_eq!(config.filter.on_error, FailurePolicy::Abort);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = load_config_from_str("[typeset]\ncompiler = \"xelatex\"\n").unwrap();
        assert_eq!(config.typeset.compiler, "xelatex");
        assert_eq!(config.typeset.converter, "pdftocairo");
    }

    #[test]
    fn empty_program_errors() {
        let err = load_config_from_str("[engine]\nprogram = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(ref f) if f == "engine.program"));
    }

    #[test]
    fn empty_session_name_errors() {
        let err = load_config_from_str("[session]\nname = \" \"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(ref f) if f == "session.name"));
    }

    #[test]
    fn zero_timeout_errors() {
        let err = load_config_from_str("[engine]\ntimeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn template_without_placeholder_errors() {
        let err = load_config_from_str("[session]\nepilogue = \"save()\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m.contains("epilogue")));
    }

    #[test]
    fn unknown_key_errors() {
        let err = load_config_from_str("[engine]\nbinary = \"sage\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn missing_file_in_dir_is_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.session.name, "sage_session");
    }

    #[test]
    fn loads_file_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[cache]\ndir = \"img\"\n").unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.cache.dir, PathBuf::from("img"));
    }

    #[test]
    fn explicit_missing_file_errors() {
        let err = load_config_file(Path::new("/nonexistent/sagedoc.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
