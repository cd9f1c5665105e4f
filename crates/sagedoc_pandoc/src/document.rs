//! A whole pandoc JSON document.

use std::io::{Read, Write};

use serde_json::Value;

use crate::error::PandocError;
use crate::walk::{walk_value, Visitor};

/// A pandoc document as read from a filter's standard input.
///
/// Only the `blocks` array and the `meta` map are walked; the API version
/// and any other top-level keys are written back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

impl Document {
    /// Wraps an already parsed JSON value.
    pub fn from_value(root: Value) -> Result<Self, PandocError> {
        match root.get("blocks") {
            Some(Value::Array(_)) => Ok(Self { root }),
            _ => Err(PandocError::Malformed {
                node: "Pandoc".to_string(),
                reason: "expected an object with a `blocks` array".to_string(),
            }),
        }
    }

    /// Parses a document from JSON text.
    pub fn parse(json: &str) -> Result<Self, PandocError> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Parses a document from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PandocError> {
        Self::from_value(serde_json::from_reader(reader)?)
    }

    /// Writes the document as compact JSON.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), PandocError> {
        serde_json::to_writer(writer, &self.root)?;
        Ok(())
    }

    /// The top-level blocks.
    pub fn blocks(&self) -> &[Value] {
        self.root["blocks"].as_array().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Consumes the document and returns its JSON.
    pub fn into_value(self) -> Value {
        self.root
    }

    /// Visits metadata first (title, author and the like render first),
    /// then the body, in document order.
    pub fn walk<V: Visitor>(&mut self, visitor: &mut V) -> Result<(), V::Error> {
        if let Some(meta) = self.root.get_mut("meta") {
            walk_value(meta, visitor)?;
        }
        if let Some(blocks) = self.root.get_mut("blocks") {
            walk_value(blocks, visitor)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{CodeBlock, InlineText};
    use crate::walk::BlockAction;
    use serde_json::json;

    struct Order(Vec<String>);

    impl Visitor for Order {
        type Error = PandocError;

        fn visit_code_block(&mut self, block: &CodeBlock) -> Result<BlockAction, PandocError> {
            self.0.push(block.text.clone());
            Ok(BlockAction::Keep)
        }

        fn visit_inline(&mut self, inline: &InlineText) -> Result<Option<InlineText>, PandocError> {
            self.0.push(inline.text().to_string());
            Ok(None)
        }
    }

    const SAMPLE: &str = r#"{
        "pandoc-api-version": [1, 23, 1],
        "meta": { "title": { "t": "MetaInlines", "c": [
            { "t": "Math", "c": [{ "t": "InlineMath" }, "title math"] }
        ] } },
        "blocks": [
            { "t": "CodeBlock", "c": [["", ["sagesilent"], []], "body code"] }
        ]
    }"#;

    #[test]
    fn parses_and_walks_meta_then_blocks() {
        let mut doc = Document::parse(SAMPLE).unwrap();
        assert_eq!(doc.blocks().len(), 1);
        let mut order = Order(Vec::new());
        doc.walk(&mut order).unwrap();
        assert_eq!(order.0, vec!["title math", "body code"]);
    }

    #[test]
    fn untouched_document_round_trips() {
        let mut doc = Document::parse(SAMPLE).unwrap();
        doc.walk(&mut Order(Vec::new())).unwrap();
        let mut out = Vec::new();
        doc.to_writer(&mut out).unwrap();
        let reparsed: Value = serde_json::from_slice(&out).unwrap();
        let original: Value = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(reparsed, original);
    }

    #[test]
    fn rejects_non_documents() {
        assert!(matches!(
            Document::from_value(json!([1, 2])),
            Err(PandocError::Malformed { .. })
        ));
        assert!(matches!(Document::parse("{"), Err(PandocError::Json(_))));
    }
}
