// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Named fragments inside a document tree.
//!
//! A fragment is an `expand` node whose `title` starts with the convention prefix
//! (`mermaid:` by default); the rest of the title, trimmed, is the fragment name. An empty
//! name is the default fragment.
//!
//! Lookup and replacement share one traversal and one predicate, so whatever `locate` finds
//! is exactly what `replace_fragment` rewrites.

mod extract;
mod mutate;

pub use extract::extract_text;
pub use mutate::{replace_fragment, Replacement};

use crate::model::{FragmentName, Node};

pub const DEFAULT_PREFIX: &str = "mermaid:";
const LABEL_ATTR: &str = "title";

/// How far below the document root fragments are searched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchDepth {
    /// Only direct children of the root. Fragments nested in other blocks are invisible.
    #[default]
    TopLevel,
    /// Pre-order walk of the whole tree. The first match in document order still wins, so a
    /// nested fragment can shadow a later top-level fragment with the same name.
    Recursive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentConvention {
    prefix: String,
    depth: SearchDepth,
}

impl Default for FragmentConvention {
    fn default() -> Self {
        Self { prefix: DEFAULT_PREFIX.to_owned(), depth: SearchDepth::default() }
    }
}

impl FragmentConvention {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), depth: SearchDepth::default() }
    }

    pub fn with_depth(mut self, depth: SearchDepth) -> Self {
        self.depth = depth;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn depth(&self) -> SearchDepth {
        self.depth
    }

    fn matches(&self, node: &Node, name: Option<&FragmentName>) -> bool {
        match fragment_name(node, self) {
            Some(found) => name.map_or(true, |wanted| wanted.as_str() == found),
            None => false,
        }
    }
}

/// Name of the fragment held by `node`, or `None` if `node` is not a labeled container.
pub fn fragment_name<'a>(node: &'a Node, convention: &FragmentConvention) -> Option<&'a str> {
    let Node::Expand(element) = node else {
        return None;
    };
    let title = element.attr_str(LABEL_ATTR).unwrap_or_default();
    title.strip_prefix(convention.prefix()).map(str::trim)
}

/// First fragment matching `name` (any fragment when `name` is `None`).
///
/// "Not found" is a normal outcome, including for roots that carry no content at all.
pub fn locate<'a>(
    root: &'a Node,
    name: Option<&FragmentName>,
    convention: &FragmentConvention,
) -> Option<&'a Node> {
    find_in(root.children()?, name, convention)
}

fn find_in<'a>(
    nodes: &'a [Node],
    name: Option<&FragmentName>,
    convention: &FragmentConvention,
) -> Option<&'a Node> {
    for node in nodes {
        if convention.matches(node, name) {
            return Some(node);
        }
        if convention.depth() == SearchDepth::Recursive {
            if let Some(found) = node.children().and_then(|c| find_in(c, name, convention)) {
                return Some(found);
            }
        }
    }
    None
}

/// Source of the fragment matching `name`, if any.
pub fn read_fragment(
    root: &Node,
    name: Option<&FragmentName>,
    convention: &FragmentConvention,
) -> Option<String> {
    locate(root, name, convention).map(|node| extract_text(Some(node)))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentSummary {
    pub name: String,
    pub source: String,
}

/// Every fragment visible under `convention`, in document order.
pub fn list_fragments(root: &Node, convention: &FragmentConvention) -> Vec<FragmentSummary> {
    let mut out = Vec::new();
    if let Some(children) = root.children() {
        collect_into(children, convention, &mut out);
    }
    out
}

fn collect_into(nodes: &[Node], convention: &FragmentConvention, out: &mut Vec<FragmentSummary>) {
    for node in nodes {
        if let Some(name) = fragment_name(node, convention) {
            out.push(FragmentSummary {
                name: name.to_owned(),
                source: extract_text(Some(node)),
            });
            continue;
        }
        if convention.depth() == SearchDepth::Recursive {
            if let Some(children) = node.children() {
                collect_into(children, convention, out);
            }
        }
    }
}
