// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{FragmentName, Node};

use super::{FragmentConvention, SearchDepth};

#[derive(Debug, Clone, PartialEq)]
pub struct Replacement {
    pub root: Node,
    /// `false` when no fragment matched; `root` is then equal to the input.
    pub replaced: bool,
}

/// Builds a new tree in which the first fragment matching `name` holds `source`.
///
/// The matched node keeps its type, attributes, and position; its children become a single
/// paragraph wrapping a single text node. Every other node is copied unchanged and the input
/// tree is left untouched.
pub fn replace_fragment(
    root: &Node,
    name: Option<&FragmentName>,
    source: &str,
    convention: &FragmentConvention,
) -> Replacement {
    let Some(children) = root.children() else {
        return Replacement { root: root.clone(), replaced: false };
    };

    let mut replaced = false;
    let content = replace_in(children, name, source, convention, &mut replaced);
    if !replaced {
        return Replacement { root: root.clone(), replaced };
    }
    Replacement { root: root.with_children(content), replaced }
}

fn replace_in(
    nodes: &[Node],
    name: Option<&FragmentName>,
    source: &str,
    convention: &FragmentConvention,
    replaced: &mut bool,
) -> Vec<Node> {
    nodes
        .iter()
        .map(|node| {
            if *replaced {
                return node.clone();
            }
            if convention.matches(node, name) {
                *replaced = true;
                return node.with_children(fragment_body(source));
            }
            if convention.depth() == SearchDepth::Recursive {
                if let Some(children) = node.children() {
                    let content = replace_in(children, name, source, convention, replaced);
                    if *replaced {
                        return node.with_children(content);
                    }
                }
            }
            node.clone()
        })
        .collect()
}

fn fragment_body(source: &str) -> Vec<Node> {
    vec![Node::paragraph(vec![Node::text(source)])]
}
