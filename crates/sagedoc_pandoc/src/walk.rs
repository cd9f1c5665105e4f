//! Document-order traversal with node replacement.

use serde_json::Value;

use crate::error::PandocError;
use crate::node::{CodeBlock, InlineText};

/// What to do with a visited code block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockAction {
    /// Leave the block exactly as it was.
    Keep,
    /// Splice these blocks in its place. An empty list deletes the block.
    Replace(Vec<Value>),
}

/// Callbacks for the nodes the filter rewrites.
///
/// Nodes are visited one at a time in document order. Replacement nodes are
/// not walked again.
pub trait Visitor {
    /// Error type returned by the callbacks.
    type Error: From<PandocError>;

    /// Called for every `CodeBlock`.
    fn visit_code_block(&mut self, block: &CodeBlock) -> Result<BlockAction, Self::Error>;

    /// Called for every `Math` and `RawInline`. `None` keeps the node.
    fn visit_inline(&mut self, inline: &InlineText) -> Result<Option<InlineText>, Self::Error>;
}

/// Walks `value` depth-first, visiting nodes in the order they appear.
pub fn walk_value<V: Visitor>(value: &mut Value, visitor: &mut V) -> Result<(), V::Error> {
    match value {
        Value::Array(items) => walk_list(items, visitor),
        Value::Object(map) => {
            for child in map.values_mut() {
                walk_value(child, visitor)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Walks a list of nodes, splicing in block replacements.
fn walk_list<V: Visitor>(items: &mut Vec<Value>, visitor: &mut V) -> Result<(), V::Error> {
    let mut out = Vec::with_capacity(items.len());
    for mut item in std::mem::take(items) {
        match kind(&item) {
            NodeKind::CodeBlock => {
                let block = CodeBlock::from_value(&item)?;
                match visitor.visit_code_block(&block)? {
                    BlockAction::Keep => out.push(item),
                    BlockAction::Replace(blocks) => out.extend(blocks),
                }
            }
            NodeKind::InlineText => {
                let inline = InlineText::from_value(&item)?;
                match visitor.visit_inline(&inline)? {
                    Some(replacement) => out.push(replacement.to_value()),
                    None => out.push(item),
                }
            }
            NodeKind::Other => {
                walk_value(&mut item, visitor)?;
                out.push(item);
            }
        }
    }
    *items = out;
    Ok(())
}

#[derive(Clone, Copy)]
enum NodeKind {
    CodeBlock,
    InlineText,
    Other,
}

fn kind(value: &Value) -> NodeKind {
    match value.get("t").and_then(Value::as_str) {
        Some("CodeBlock") => NodeKind::CodeBlock,
        Some("Math") | Some("RawInline") => NodeKind::InlineText,
        _ => NodeKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct Recorder {
        seen: Vec<String>,
    }

    impl Visitor for Recorder {
        type Error = PandocError;

        fn visit_code_block(&mut self, block: &CodeBlock) -> Result<BlockAction, PandocError> {
            self.seen.push(format!("block:{}", block.text));
            if block.attr.has_class("drop") {
                return Ok(BlockAction::Replace(vec![]));
            }
            if block.attr.has_class("split") {
                return Ok(BlockAction::Replace(vec![
                    json!({ "t": "HorizontalRule" }),
                    json!({ "t": "CodeBlock", "c": [["", ["nested"], []], "not revisited"] }),
                ]));
            }
            Ok(BlockAction::Keep)
        }

        fn visit_inline(&mut self, inline: &InlineText) -> Result<Option<InlineText>, PandocError> {
            self.seen.push(format!("inline:{}", inline.text()));
            Ok(Some(inline.with_text(inline.text().to_uppercase())))
        }
    }

    fn code(class: &str, text: &str) -> Value {
        json!({ "t": "CodeBlock", "c": [["", [class], []], text] })
    }

    #[test]
    fn visits_in_document_order() {
        let mut blocks = json!([
            code("a", "one"),
            { "t": "Para", "c": [
                { "t": "Str", "c": "x" },
                { "t": "Math", "c": [{ "t": "InlineMath" }, "two"] }
            ]},
            { "t": "BlockQuote", "c": [code("b", "three")] },
            { "t": "Plain", "c": [{ "t": "RawInline", "c": ["tex", "four"] }] }
        ]);
        let mut recorder = Recorder::default();
        walk_value(&mut blocks, &mut recorder).unwrap();
        assert_eq!(
            recorder.seen,
            vec!["block:one", "inline:two", "block:three", "inline:four"]
        );
        assert_eq!(blocks[1]["c"][1]["c"][1], "TWO");
        assert_eq!(blocks[3]["c"][0]["c"][0], "tex");
    }

    #[test]
    fn splices_replacements_without_revisiting() {
        let mut blocks = json!([code("drop", "gone"), code("split", "many"), code("keep", "kept")]);
        let mut recorder = Recorder::default();
        walk_value(&mut blocks, &mut recorder).unwrap();
        let list = blocks.as_array().unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[0]["t"], "HorizontalRule");
        assert_eq!(list[1]["c"][1], "not revisited");
        assert_eq!(list[2], code("keep", "kept"));
        assert_eq!(recorder.seen, vec!["block:gone", "block:many", "block:kept"]);
    }

    #[test]
    fn malformed_node_is_an_error() {
        let mut blocks = json!([{ "t": "CodeBlock", "c": 5 }]);
        let err = walk_value(&mut blocks, &mut Recorder::default()).unwrap_err();
        assert!(matches!(err, PandocError::Malformed { .. }));
    }
}
