// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Document tree nodes.
//!
//! Pages and issue descriptions arrive as an Atlassian-document-format style JSON tree. The
//! node kinds this crate interprets get their own variant; everything else is carried through
//! untouched so a decode/encode cycle never loses data the store sent us.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use smol_str::SmolStr;

pub const KIND_DOC: &str = "doc";
pub const KIND_EXPAND: &str = "expand";
pub const KIND_PARAGRAPH: &str = "paragraph";
pub const KIND_CODE_BLOCK: &str = "codeBlock";
pub const KIND_TEXT: &str = "text";

const KEY_TYPE: &str = "type";
const KEY_ATTRS: &str = "attrs";
const KEY_CONTENT: &str = "content";
const KEY_TEXT: &str = "text";

pub type Attrs = Map<String, Value>;

/// Attributes, children, and any other keys of a structural node.
///
/// Equality ignores the key order a node was decoded with.
#[derive(Debug, Clone, Default)]
pub struct Element {
    attrs: Option<Attrs>,
    content: Option<Vec<Node>>,
    extra: Map<String, Value>,
    key_order: Vec<String>,
}

impl Element {
    pub fn new(attrs: Option<Attrs>, content: Option<Vec<Node>>) -> Self {
        Self { attrs, content, extra: Map::new(), key_order: Vec::new() }
    }

    pub fn attrs(&self) -> Option<&Attrs> {
        self.attrs.as_ref()
    }

    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs.as_ref()?.get(key)?.as_str()
    }

    pub fn content(&self) -> Option<&[Node]> {
        self.content.as_deref()
    }

    /// Keys other than `type`/`attrs`/`content` (e.g. `marks`, `localId`).
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    fn with_content(&self, content: Vec<Node>) -> Self {
        Self { content: Some(content), ..self.clone() }
    }

    fn encode_field(&self, kind: &str, key: &str, out: &mut Map<String, Value>) {
        let value = match key {
            KEY_TYPE => Some(Value::String(kind.to_owned())),
            KEY_ATTRS => self.attrs.clone().map(Value::Object),
            KEY_CONTENT => self
                .content
                .as_ref()
                .map(|content| Value::Array(content.iter().map(Node::to_value).collect())),
            _ => self.extra.get(key).cloned(),
        };
        if let Some(value) = value {
            out.insert(key.to_owned(), value);
        }
    }

    fn encode(&self, kind: &str) -> Value {
        let mut out = Map::new();
        let defaults = [KEY_TYPE, KEY_ATTRS, KEY_CONTENT].into_iter();
        let keys = self.key_order.iter().map(String::as_str).chain(defaults);
        for key in keys.chain(self.extra.keys().map(String::as_str)) {
            if !out.contains_key(key) {
                self.encode_field(kind, key, &mut out);
            }
        }
        Value::Object(out)
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.attrs == other.attrs && self.content == other.content && self.extra == other.extra
    }
}

/// A `text` leaf. The payload is optional; a missing payload reads as the empty string.
#[derive(Debug, Clone, Default)]
pub struct TextNode {
    text: Option<String>,
    extra: Map<String, Value>,
    key_order: Vec<String>,
}

impl TextNode {
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    fn encode(&self) -> Value {
        let mut out = Map::new();
        let defaults = [KEY_TYPE, KEY_TEXT].into_iter();
        let keys = self.key_order.iter().map(String::as_str).chain(defaults);
        for key in keys.chain(self.extra.keys().map(String::as_str)) {
            if out.contains_key(key) {
                continue;
            }
            let value = match key {
                KEY_TYPE => Some(Value::String(KIND_TEXT.to_owned())),
                KEY_TEXT => self.text.clone().map(Value::String),
                _ => self.extra.get(key).cloned(),
            };
            if let Some(value) = value {
                out.insert(key.to_owned(), value);
            }
        }
        Value::Object(out)
    }
}

impl PartialEq for TextNode {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text && self.extra == other.extra
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Labeled container; fragments live here.
    Expand(Element),
    Paragraph(Element),
    CodeBlock(Element),
    Text(TextNode),
    /// Any other node kind that has children.
    Block { kind: SmolStr, element: Element },
    /// Any other node kind without children.
    Leaf { kind: SmolStr, element: Element },
    /// A value that does not look like a node. Re-encoded exactly as received.
    Opaque(Value),
}

impl Node {
    /// A version-1 document root.
    pub fn doc(content: Vec<Node>) -> Self {
        let mut element = Element::new(None, Some(content));
        element.extra.insert("version".to_owned(), Value::from(1));
        Self::Block { kind: SmolStr::new_static(KIND_DOC), element }
    }

    pub fn expand(title: impl Into<String>, content: Vec<Node>) -> Self {
        let mut attrs = Attrs::new();
        attrs.insert("title".to_owned(), Value::String(title.into()));
        Self::Expand(Element::new(Some(attrs), Some(content)))
    }

    pub fn paragraph(content: Vec<Node>) -> Self {
        Self::Paragraph(Element::new(None, Some(content)))
    }

    pub fn code_block(language: impl Into<String>, source: impl Into<String>) -> Self {
        let mut attrs = Attrs::new();
        attrs.insert("language".to_owned(), Value::String(language.into()));
        Self::CodeBlock(Element::new(Some(attrs), Some(vec![Self::text(source)])))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextNode { text: Some(text.into()), ..TextNode::default() })
    }

    /// The node's `type` tag, if it has one.
    pub fn kind(&self) -> Option<&str> {
        match self {
            Self::Expand(_) => Some(KIND_EXPAND),
            Self::Paragraph(_) => Some(KIND_PARAGRAPH),
            Self::CodeBlock(_) => Some(KIND_CODE_BLOCK),
            Self::Text(_) => Some(KIND_TEXT),
            Self::Block { kind, .. } | Self::Leaf { kind, .. } => Some(kind.as_str()),
            Self::Opaque(_) => None,
        }
    }

    pub fn element(&self) -> Option<&Element> {
        match self {
            Self::Expand(element)
            | Self::Paragraph(element)
            | Self::CodeBlock(element)
            | Self::Block { element, .. }
            | Self::Leaf { element, .. } => Some(element),
            Self::Text(_) | Self::Opaque(_) => None,
        }
    }

    pub fn children(&self) -> Option<&[Node]> {
        self.element()?.content()
    }

    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.element()?.attr_str(key)
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns a copy of this node with its children swapped out.
    ///
    /// Type, attributes, and extra keys are kept. Nodes that cannot hold children (`Text`,
    /// `Opaque`) come back unchanged.
    pub fn with_children(&self, content: Vec<Node>) -> Node {
        match self {
            Self::Expand(element) => Self::Expand(element.with_content(content)),
            Self::Paragraph(element) => Self::Paragraph(element.with_content(content)),
            Self::CodeBlock(element) => Self::CodeBlock(element.with_content(content)),
            Self::Block { kind, element } | Self::Leaf { kind, element } => {
                Self::Block { kind: kind.clone(), element: element.with_content(content) }
            }
            Self::Text(_) | Self::Opaque(_) => self.clone(),
        }
    }

    /// Interprets a JSON value as a node. Never fails: malformed input becomes `Opaque`.
    pub fn from_value(value: Value) -> Node {
        let Value::Object(mut map) = value else {
            return Self::Opaque(value);
        };

        let Some(kind) = map.get(KEY_TYPE).and_then(Value::as_str).map(SmolStr::new) else {
            return Self::Opaque(Value::Object(map));
        };
        let key_order: Vec<String> = map.keys().cloned().collect();

        if kind == KIND_TEXT {
            if map.get(KEY_TEXT).is_some_and(|text| !text.is_string()) {
                return Self::Opaque(Value::Object(map));
            }
            map.remove(KEY_TYPE);
            let text = match map.remove(KEY_TEXT) {
                Some(Value::String(text)) => Some(text),
                _ => None,
            };
            return Self::Text(TextNode { text, extra: map, key_order });
        }

        let attrs_ok = map.get(KEY_ATTRS).map_or(true, Value::is_object);
        let content_ok = map.get(KEY_CONTENT).map_or(true, Value::is_array);
        if !attrs_ok || !content_ok {
            return Self::Opaque(Value::Object(map));
        }

        map.remove(KEY_TYPE);
        let attrs = match map.remove(KEY_ATTRS) {
            Some(Value::Object(attrs)) => Some(attrs),
            _ => None,
        };
        let content = match map.remove(KEY_CONTENT) {
            Some(Value::Array(items)) => Some(items.into_iter().map(Node::from_value).collect()),
            _ => None,
        };
        let element = Element { attrs, content, extra: map, key_order };

        match kind.as_str() {
            KIND_EXPAND => Self::Expand(element),
            KIND_PARAGRAPH => Self::Paragraph(element),
            KIND_CODE_BLOCK => Self::CodeBlock(element),
            _ if element.content.is_some() => Self::Block { kind, element },
            _ => Self::Leaf { kind, element },
        }
    }

    /// Encodes the node, writing keys back in the order they were decoded in.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Opaque(value) => value.clone(),
            Self::Text(text) => text.encode(),
            Self::Expand(element) => element.encode(KIND_EXPAND),
            Self::Paragraph(element) => element.encode(KIND_PARAGRAPH),
            Self::CodeBlock(element) => element.encode(KIND_CODE_BLOCK),
            Self::Block { kind, element } | Self::Leaf { kind, element } => element.encode(kind),
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Node::from_value)
    }
}
