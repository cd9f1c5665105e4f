//! `sageplot` blocks: setup lines followed by one plot directive line.

use once_cell::sync::Lazy;
use regex::Regex;

static DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\w+\[(?P<options>.*)\]\((?P<expr>.*)\)\s*$").expect("plot directive pattern")
});

/// The last line of a plot block: what to plot and how.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlotDirective {
    /// Expression whose value has a `save` method.
    pub expression: String,
    /// Extra `save` arguments, verbatim. Empty for none.
    pub options: String,
}

impl PlotDirective {
    /// Parses `name[options](expression)`; anything else is a bare expression.
    pub fn parse(line: &str) -> Self {
        match DIRECTIVE.captures(line) {
            Some(caps) => Self {
                expression: caps["expr"].to_string(),
                options: caps["options"].to_string(),
            },
            None => Self {
                expression: line.to_string(),
                options: String::new(),
            },
        }
    }

    /// `(<expression>).save("<image>"[, <options>])`
    pub fn save_statement(&self, image: &str) -> String {
        if self.options.is_empty() {
            format!("({}).save(\"{image}\")", self.expression)
        } else {
            format!("({}).save(\"{image}\",{})", self.expression, self.options)
        }
    }
}

/// A plot block split into its setup code and trailing directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlotBlock {
    /// Every line before the directive, newline-joined.
    pub setup: String,
    /// The parsed final line.
    pub directive: PlotDirective,
}

impl PlotBlock {
    /// Splits block text after stripping leading and trailing newlines.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim_matches('\n');
        let (setup, last) = match trimmed.rsplit_once('\n') {
            Some((setup, last)) => (setup, last),
            None => ("", trimmed),
        };
        Self {
            setup: setup.to_string(),
            directive: PlotDirective::parse(last),
        }
    }

    /// The engine source: setup code, then the save statement on its own line.
    pub fn script_source(&self, image: &str) -> String {
        format!("{}\n{}", self.setup, self.directive.save_statement(image))
    }
}
