// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::Node;

/// Concatenates every `text` payload below `node`, depth-first, with no separator.
///
/// Total: `None`, leaves, and opaque values all yield `""`.
pub fn extract_text(node: Option<&Node>) -> String {
    let mut out = String::new();
    if let Some(node) = node {
        push_text(node, &mut out);
    }
    out
}

fn push_text(node: &Node, out: &mut String) {
    if let Node::Text(text) = node {
        out.push_str(text.text().unwrap_or_default());
        return;
    }
    for child in node.children().unwrap_or_default() {
        push_text(child, out);
    }
}
