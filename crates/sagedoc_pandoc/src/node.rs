//! The pandoc nodes the filter reads and builds.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::PandocError;

/// Node attributes: identifier, classes, and key/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attr(pub String, pub Vec<String>, pub Vec<(String, String)>);

impl Attr {
    /// Builds attributes from parts.
    pub fn new(id: impl Into<String>, classes: Vec<String>, pairs: Vec<(String, String)>) -> Self {
        Self(id.into(), classes, pairs)
    }

    /// The element identifier, possibly empty.
    pub fn id(&self) -> &str {
        &self.0
    }

    /// The element classes, in source order.
    pub fn classes(&self) -> &[String] {
        &self.1
    }

    /// The key/value attributes, in source order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.2
    }

    /// Returns `true` if `class` is among the classes.
    pub fn has_class(&self, class: &str) -> bool {
        self.1.iter().any(|c| c == class)
    }
}

/// Whether a `Math` node is inline or display math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum MathType {
    /// `$$...$$`
    DisplayMath,
    /// `$...$`
    InlineMath,
}

/// A fenced or indented code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// The block's attributes, including its classes.
    pub attr: Attr,
    /// The block's literal content.
    pub text: String,
}

/// An inline node whose text may contain directives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineText {
    /// A math span.
    Math {
        /// Inline or display.
        math_type: MathType,
        /// The TeX source of the span.
        text: String,
    },
    /// A raw span passed through to one output format.
    RawInline {
        /// Target format, e.g. `tex`.
        format: String,
        /// The raw content.
        text: String,
    },
}

impl InlineText {
    /// The span's text.
    pub fn text(&self) -> &str {
        match self {
            InlineText::Math { text, .. } | InlineText::RawInline { text, .. } => text,
        }
    }

    /// The same kind of span (same math type or format) with new text.
    pub fn with_text(&self, text: String) -> Self {
        match self {
            InlineText::Math { math_type, .. } => InlineText::Math {
                math_type: *math_type,
                text,
            },
            InlineText::RawInline { format, .. } => InlineText::RawInline {
                format: format.clone(),
                text,
            },
        }
    }

    /// Encodes the span as a pandoc JSON inline.
    pub fn to_value(&self) -> Value {
        match self {
            InlineText::Math { math_type, text } => {
                json!({ "t": "Math", "c": [math_type, text] })
            }
            InlineText::RawInline { format, text } => raw_inline(format, text),
        }
    }
}

/// Wire shapes of the nodes read from the input.
#[derive(Deserialize)]
#[serde(tag = "t", content = "c")]
enum Wire {
    CodeBlock(Attr, String),
    Math(MathType, String),
    RawInline(String, String),
}

fn decode(tag: &str, value: &Value) -> Result<Wire, PandocError> {
    Wire::deserialize(value).map_err(|e| PandocError::Malformed {
        node: tag.to_string(),
        reason: e.to_string(),
    })
}

impl CodeBlock {
    /// Decodes a `CodeBlock` JSON node.
    pub fn from_value(value: &Value) -> Result<Self, PandocError> {
        match decode("CodeBlock", value)? {
            Wire::CodeBlock(attr, text) => Ok(Self { attr, text }),
            _ => Err(PandocError::Malformed {
                node: "CodeBlock".to_string(),
                reason: "not a code block".to_string(),
            }),
        }
    }

    /// Encodes the block as a pandoc JSON block.
    pub fn to_value(&self) -> Value {
        json!({ "t": "CodeBlock", "c": [self.attr, self.text] })
    }
}

impl InlineText {
    /// Decodes a `Math` or `RawInline` JSON node.
    pub fn from_value(value: &Value) -> Result<Self, PandocError> {
        let tag = value.get("t").and_then(Value::as_str).unwrap_or("inline");
        match decode(tag, value)? {
            Wire::Math(math_type, text) => Ok(InlineText::Math { math_type, text }),
            Wire::RawInline(format, text) => Ok(InlineText::RawInline { format, text }),
            Wire::CodeBlock(..) => Err(PandocError::Malformed {
                node: tag.to_string(),
                reason: "not an inline".to_string(),
            }),
        }
    }
}

/// `RawInline format text`
pub fn raw_inline(format: &str, text: &str) -> Value {
    json!({ "t": "RawInline", "c": [format, text] })
}

/// `Plain inlines`
pub fn plain(inlines: Vec<Value>) -> Value {
    json!({ "t": "Plain", "c": inlines })
}

/// `Para inlines`
pub fn para(inlines: Vec<Value>) -> Value {
    json!({ "t": "Para", "c": inlines })
}

/// `Image attr [] (url, "")`
pub fn image(attr: &Attr, url: &str) -> Value {
    json!({ "t": "Image", "c": [attr, [], [url, ""]] })
}
