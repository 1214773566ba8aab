// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

use super::ids::{IssueKey, PageId};
use super::node::Node;

/// A fetched page. Values are never edited in place; an update produces a new write payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: PageId,
    title: String,
    version: u64,
    body: Node,
}

impl Document {
    pub fn new(id: PageId, title: impl Into<String>, version: u64, body: Node) -> Self {
        Self { id, title: title.into(), version, body }
    }

    pub fn id(&self) -> &PageId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Version as reported by the store. Only the store assigns versions.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn body(&self) -> &Node {
        &self.body
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionStamp {
    pub number: u64,
    pub message: String,
}

/// Full-document write. `version.number` must be exactly one above the version it was
/// derived from; the store rejects it otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentUpdate {
    pub id: PageId,
    pub title: String,
    pub body: Node,
    pub version: VersionStamp,
}

impl DocumentUpdate {
    /// The version this update was derived from.
    pub fn base_version(&self) -> u64 {
        self.version.number.saturating_sub(1)
    }
}

/// One entry of a page's version history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub number: u64,
    pub message: String,
    pub created_at_millis: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub key: IssueKey,
    pub description: Option<Node>,
}

#[cfg(test)]
mod tests {
    use super::{DocumentUpdate, VersionStamp};
    use crate::model::{Node, PageId};

    #[test]
    fn update_base_version_is_one_below_its_stamp() {
        let update = DocumentUpdate {
            id: PageId::new("1").expect("page id"),
            title: "Page".to_owned(),
            body: Node::doc(Vec::new()),
            version: VersionStamp { number: 4, message: String::new() },
        };
        assert_eq!(update.base_version(), 3);
    }
}
