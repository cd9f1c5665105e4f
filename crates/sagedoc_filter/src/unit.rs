//! Computation units: one block or inline expression bound for the engine.

use std::fmt;

use sagedoc_common::ContentHash;
use sagedoc_pandoc::CodeBlock;

/// What a unit is for, which decides how its result is used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitKind {
    /// Run for side effects; output discarded.
    Silent,
    /// Output re-parsed as markup.
    Visible,
    /// Saves an image.
    Plot,
    /// TeX source typeset to an image.
    RawTypeset,
    /// Inline directive; output spliced into text.
    Inline,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnitKind::Silent => "silent",
            UnitKind::Visible => "visible",
            UnitKind::Plot => "plot",
            UnitKind::RawTypeset => "latex",
            UnitKind::Inline => "inline",
        })
    }
}

/// Source text plus what to do with it. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComputationUnit {
    source: String,
    kind: UnitKind,
    attributes: Vec<(String, String)>,
}

impl ComputationUnit {
    /// Creates a unit from raw parts.
    pub fn new(kind: UnitKind, source: impl Into<String>, attributes: Vec<(String, String)>) -> Self {
        Self {
            source: source.into(),
            kind,
            attributes,
        }
    }

    /// A unit running `source` with the block's key/value attributes.
    pub fn from_block(kind: UnitKind, source: impl Into<String>, block: &CodeBlock) -> Self {
        Self::new(kind, source, block.attr.pairs().to_vec())
    }

    /// An inline directive unit.
    pub fn inline(source: impl Into<String>) -> Self {
        Self::new(UnitKind::Inline, source, Vec::new())
    }

    /// The text handed to the engine (before the session envelope).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The unit's kind.
    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    /// Key/value attributes declared on the originating node.
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// The cache key of the unit's source.
    pub fn hash(&self) -> ContentHash {
        ContentHash::of(&self.source)
    }

    /// First line of the source, shortened for log messages.
    pub fn excerpt(&self) -> String {
        const MAX: usize = 60;
        let line = self.source.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        let line = line.trim();
        if line.chars().count() > MAX {
            let cut: String = line.chars().take(MAX).collect();
            format!("{cut}...")
        } else {
            line.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sagedoc_pandoc::Attr;

    #[test]
    fn from_block_keeps_pairs() {
        let block = CodeBlock {
            attr: Attr::new(
                "fig",
                vec!["sageplot".to_string()],
                vec![("width".to_string(), "4in".to_string())],
            ),
            text: "plot(x)".to_string(),
        };
        let unit = ComputationUnit::from_block(UnitKind::Plot, "setup", &block);
        assert_eq!(unit.source(), "setup");
        assert_eq!(unit.kind(), UnitKind::Plot);
        assert_eq!(unit.attributes(), &[("width".to_string(), "4in".to_string())]);
    }

    #[test]
    fn hash_is_of_source() {
        let unit = ComputationUnit::inline("print(1)");
        assert_eq!(unit.hash(), ContentHash::of("print(1)"));
    }

    #[test]
    fn excerpt_skips_blank_lines_and_truncates() {
        let unit = ComputationUnit::inline("\n\n  x = 1\ny = 2");
        assert_eq!(unit.excerpt(), "x = 1");
        let long = ComputationUnit::inline("a".repeat(100));
        assert_eq!(long.excerpt(), format!("{}...", "a".repeat(60)));
    }

    #[test]
    fn kind_display() {
        assert_eq!(UnitKind::RawTypeset.to_string(), "latex");
        assert_eq!(UnitKind::Inline.to_string(), "inline");
    }
}
