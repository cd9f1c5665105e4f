//! Inline `\sage{...}` directives inside math and raw spans.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::FilterError;

static DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\sage\{([^}]*)\}").expect("inline directive pattern"));

/// How a directive's argument is turned into engine source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InlineCommand {
    /// Already a `print` call; run as written.
    Print,
    /// A `latex(...)` call; its value is printed.
    Latex,
    /// Any expression; its LaTeX form is printed.
    Expression,
}

impl InlineCommand {
    /// Classifies a directive argument by its prefix.
    pub fn classify(argument: &str) -> Self {
        if argument.starts_with("print") {
            InlineCommand::Print
        } else if argument.starts_with("latex") {
            InlineCommand::Latex
        } else {
            InlineCommand::Expression
        }
    }

    /// The engine source for `argument`.
    pub fn source(self, argument: &str) -> String {
        match self {
            InlineCommand::Print => argument.to_string(),
            InlineCommand::Latex => format!("print({argument})"),
            InlineCommand::Expression => format!("print(latex({argument}))"),
        }
    }
}

/// One directive occurrence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Directive<'a> {
    /// The full `\sage{...}` text.
    pub literal: &'a str,
    /// The text between the braces.
    pub argument: &'a str,
}

impl Directive<'_> {
    /// The engine source this directive runs.
    pub fn command_source(&self) -> String {
        InlineCommand::classify(self.argument).source(self.argument)
    }
}

/// Every directive in `text`, left to right.
pub fn find_directives(text: &str) -> Vec<Directive<'_>> {
    DIRECTIVE
        .captures_iter(text)
        .filter_map(|caps| {
            let literal = caps.get(0)?.as_str();
            let argument = caps.get(1)?.as_str();
            Some(Directive { literal, argument })
        })
        .collect()
}

/// Outcome of substituting one text span.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Substitution {
    /// The rewritten text.
    pub text: String,
    /// Occurrences whose output was spliced in.
    pub resolved: usize,
    /// Occurrences left as written.
    pub unresolved: usize,
}

/// Replaces each directive with the output of `run`.
///
/// `run` gets the command source and returns the engine's stdout, or `None`
/// to leave the directive in place. Every literal copy of a directive is
/// replaced at once, so a repeated directive finds nothing left to replace
/// and counts as unresolved even though it was run.
pub fn substitute_with<F>(text: &str, mut run: F) -> Result<Substitution, FilterError>
where
    F: FnMut(&str) -> Result<Option<String>, FilterError>,
{
    let mut contents = text.to_string();
    let mut resolved = 0;
    let mut unresolved = 0;
    for directive in find_directives(text) {
        let Some(output) = run(&directive.command_source())? else {
            unresolved += 1;
            continue;
        };
        if contents.contains(directive.literal) {
            contents = contents.replace(directive.literal, output.trim_end());
            resolved += 1;
        } else {
            debug!("{} already substituted", directive.literal);
            unresolved += 1;
        }
    }
    Ok(Substitution {
        text: contents,
        resolved,
        unresolved,
    })
}
