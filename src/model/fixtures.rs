// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::document::{Document, Issue};
use super::ids::{IssueKey, PageId};
use super::node::Node;

pub(crate) const DEFAULT_DIAGRAM: &str = "graph TD
    A[Start] --> B{Decision}
    B -->|Yes| C[Action 1]
    B -->|No| D[Action 2]
    C --> E[End]
    D --> E";

fn page_id(value: &str) -> PageId {
    PageId::new(value).expect("page id")
}

/// Page `12345`, version 3, with a single `mermaid:flow` fragment.
pub(crate) fn flow_page() -> Document {
    let body = Node::doc(vec![
        Node::paragraph(vec![Node::text("Intro")]),
        Node::expand("mermaid:flow", vec![Node::paragraph(vec![Node::text("graph TD; A-->B")])]),
        Node::paragraph(vec![Node::text("Outro")]),
    ]);
    Document::new(page_id("12345"), "Flow page", 3, body)
}

/// A page with several fragments, a decoy expand, and one fragment nested in a panel.
pub(crate) fn multi_fragment_page() -> Document {
    let body = Node::doc(vec![
        Node::expand("Details", vec![Node::paragraph(vec![Node::text("not a diagram")])]),
        Node::expand("mermaid: ", vec![Node::paragraph(vec![Node::text(DEFAULT_DIAGRAM)])]),
        Node::expand(
            "mermaid:seq",
            vec![
                Node::paragraph(vec![Node::text("sequenceDiagram\n")]),
                Node::paragraph(vec![Node::text("A->>B: hi")]),
            ],
        ),
        Node::from_value(serde_json::json!({
            "type": "panel",
            "attrs": { "panelType": "note" },
            "content": [
                {
                    "type": "expand",
                    "attrs": { "title": "mermaid:nested" },
                    "content": [ { "type": "paragraph", "content": [
                        { "type": "text", "text": "graph LR; X-->Y" }
                    ] } ]
                }
            ]
        })),
    ]);
    Document::new(page_id("777"), "Architecture", 12, body)
}

/// Issue `DEMO-1` whose description carries two Mermaid code blocks.
pub(crate) fn demo_issue() -> Issue {
    let description = Node::doc(vec![
        Node::paragraph(vec![Node::text("Login flow:")]),
        Node::code_block("mermaid", "sequenceDiagram\n  A->>B: login\n"),
        Node::code_block("rust", "fn main() {}"),
        Node::paragraph(vec![Node::text("Deploy:")]),
        Node::code_block("mermaid", "graph LR; build-->ship"),
    ]);
    Issue { key: IssueKey::new("DEMO-1").expect("issue key"), description: Some(description) }
}
