// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only extraction of fenced diagrams from flattened issue text.
//!
//! This path works on rendered text, not on the document tree, so it is best effort: fences
//! are matched by pattern and nothing here is ever written back.

use regex::{Regex, RegexBuilder};

use crate::fragment::extract_text;
use crate::model::node::{Node, KIND_CODE_BLOCK, KIND_PARAGRAPH, KIND_TEXT};

pub const DEFAULT_FENCE_LANGUAGE: &str = "mermaid";

const FENCE: &str = "```";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LooseFragment {
    /// Position among the fragments found in the scanned text.
    pub id: usize,
    pub source: String,
}

/// Finds ```` ```<language> ```` fenced blocks in text.
#[derive(Debug, Clone)]
pub struct FenceScanner {
    language: String,
    pattern: Regex,
}

impl FenceScanner {
    pub fn new(language: impl Into<String>) -> Result<Self, regex::Error> {
        let language = language.into();
        let pattern = RegexBuilder::new(&format!(
            "{fence}{language}\n(.*?){fence}",
            fence = regex::escape(FENCE),
            language = regex::escape(&language),
        ))
        .dot_matches_new_line(true)
        .build()?;
        Ok(Self { language, pattern })
    }

    pub fn mermaid() -> Result<Self, regex::Error> {
        Self::new(DEFAULT_FENCE_LANGUAGE)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// All fenced bodies in appearance order, trimmed. No fences means an empty list.
    pub fn scan(&self, text: &str) -> Vec<LooseFragment> {
        self.pattern
            .captures_iter(text)
            .filter_map(|captures| captures.get(1))
            .enumerate()
            .map(|(id, body)| LooseFragment { id, source: body.as_str().trim().to_owned() })
            .collect()
    }
}

/// Renders a description tree to the flat text the scanner reads.
///
/// Code blocks in `language` become fenced blocks, paragraphs and text contribute their text,
/// other containers are flattened recursively. Parts are joined with newlines.
pub fn flatten_description(root: &Node, language: &str) -> String {
    let Some(children) = root.children() else {
        return String::new();
    };
    children.iter().map(|node| flatten_node(node, language)).collect::<Vec<_>>().join("\n")
}

fn flatten_node(node: &Node, language: &str) -> String {
    match node.kind() {
        Some(KIND_CODE_BLOCK) if node.attr_str("language") == Some(language) => {
            let body = node
                .children()
                .unwrap_or_default()
                .iter()
                .map(|child| child.as_text().and_then(|text| text.text()).unwrap_or_default())
                .collect::<String>();
            format!("{FENCE}{language}\n{body}{FENCE}")
        }
        Some(KIND_PARAGRAPH | KIND_TEXT) => extract_text(Some(node)),
        _ if node.children().is_some() => flatten_description(node, language),
        _ => String::new(),
    }
}
