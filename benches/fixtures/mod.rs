// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use nereid_wiki::model::{Document, Node, PageId};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(prefix: &str) -> Self {
        let pid = std::process::id();
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut path = std::env::temp_dir();
        path.push(format!("nereid_wiki_bench_{prefix}_{pid}_{nanos}_{counter}"));
        std::fs::create_dir_all(&path).expect("create temp dir");

        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Case {
    Small,
    Medium,
    Large,
}

impl Case {
    pub const ALL: [Case; 3] = [Case::Small, Case::Medium, Case::Large];

    pub fn id(self) -> &'static str {
        match self {
            Case::Small => "small",
            Case::Medium => "medium",
            Case::Large => "large",
        }
    }

    /// (top-level blocks, fragments)
    fn shape(self) -> (usize, usize) {
        match self {
            Case::Small => (20, 2),
            Case::Medium => (200, 10),
            Case::Large => (2_000, 50),
        }
    }
}

/// Name of the last fragment on a `Case` page, the worst case for a top-level search.
pub fn last_fragment_name(case: Case) -> String {
    format!("d{}", case.shape().1 - 1)
}

fn flow_source(index: usize, steps: usize) -> String {
    let mut out = String::from("graph TD\n");
    for step in 0..steps {
        out.push_str(&format!("    n{index}_{step} --> n{index}_{}\n", step + 1));
    }
    out
}

/// A page of prose paragraphs with fragments spread evenly through it.
pub fn page(case: Case) -> Document {
    let (blocks, fragments) = case.shape();
    let every = blocks / fragments;
    let mut content = Vec::with_capacity(blocks);
    let mut next_fragment = 0;
    for index in 0..blocks {
        if next_fragment < fragments && index % every == every - 1 {
            content.push(Node::expand(
                format!("mermaid:d{next_fragment}"),
                vec![Node::paragraph(vec![Node::text(flow_source(next_fragment, 12))])],
            ));
            next_fragment += 1;
        } else {
            content.push(Node::paragraph(vec![Node::text(format!(
                "Paragraph {index} describing the system in plain words."
            ))]));
        }
    }
    Document::new(PageId::new("4242").expect("page id"), "Bench page", 1, Node::doc(content))
}

/// Same page, with every block wrapped one level deep so only recursive search finds them.
pub fn nested_page(case: Case) -> Document {
    let flat = page(case);
    let wrapped = flat
        .body()
        .children()
        .unwrap_or_default()
        .iter()
        .map(|node| {
            Node::from_value(serde_json::json!({
                "type": "panel",
                "attrs": { "panelType": "info" },
                "content": [node.to_value()],
            }))
        })
        .collect();
    Document::new(flat.id().clone(), flat.title(), flat.version(), Node::doc(wrapped))
}

/// Flattened issue text with `fragments` fenced blocks among prose.
pub fn description(case: Case) -> String {
    let (blocks, fragments) = case.shape();
    let every = blocks / fragments;
    let mut out = String::new();
    for index in 0..blocks {
        if index % every == every - 1 {
            out.push_str("```mermaid\n");
            out.push_str(&flow_source(index, 6));
            out.push_str("```\n");
        } else {
            out.push_str(&format!("Line {index} of the issue description.\n"));
        }
    }
    out
}
