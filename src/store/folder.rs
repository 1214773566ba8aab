// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::model::{Document, DocumentUpdate, Issue, IssueKey, Node, PageId, VersionRecord};

use super::{
    check_increment, newest_first, now_millis, push_history, DocumentStore, FetchError,
    IssueSource, WriteError,
};

const PAGES_DIR: &str = "pages";
const ISSUES_DIR: &str = "issues";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file and renames atomically into place.
    /// - Does not perform per-file fsync/sync.
    #[default]
    BestEffort,

    /// Slower, best-effort durability.
    ///
    /// Flushes file contents and the rename to stable storage where the platform allows it.
    Durable,
}

#[derive(Debug, Serialize, Deserialize)]
struct PageFile {
    id: String,
    title: String,
    version: u64,
    body: Node,
    #[serde(default)]
    history: VecDeque<VersionRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct IssueFile {
    key: String,
    #[serde(default)]
    description: Option<Node>,
}

/// A store backed by a directory of JSON files.
///
/// Layout: `pages/<id>.json` and `issues/<KEY>.json` under the root. Writes go through a
/// temp file and an atomic rename. Writers in one process are serialized per root directory,
/// across every `StoreFolder` opened on it, which makes the compare-and-increment atomic for
/// everything served by that process.
#[derive(Debug, Clone)]
pub struct StoreFolder {
    root: PathBuf,
    durability: WriteDurability,
}

impl StoreFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), durability: WriteDurability::default() }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn page_path(&self, id: &PageId) -> PathBuf {
        self.root.join(PAGES_DIR).join(format!("{id}.json"))
    }

    pub fn issue_path(&self, key: &IssueKey) -> PathBuf {
        self.root.join(ISSUES_DIR).join(format!("{key}.json"))
    }

    /// Stores a page as-is (no version check), resetting its history.
    pub fn put_page(&self, document: &Document) -> Result<(), WriteError> {
        let lock = root_write_lock(&self.root);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut history = VecDeque::new();
        history.push_back(VersionRecord {
            number: document.version(),
            message: "Imported".to_owned(),
            created_at_millis: now_millis(),
        });
        let file = PageFile {
            id: document.id().to_string(),
            title: document.title().to_owned(),
            version: document.version(),
            body: document.body().clone(),
            history,
        };
        write_json(&self.page_path(document.id()), &file, self.durability)
    }

    pub fn put_issue(&self, issue: &Issue) -> Result<(), WriteError> {
        let lock = root_write_lock(&self.root);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let file = IssueFile { key: issue.key.to_string(), description: issue.description.clone() };
        write_json(&self.issue_path(&issue.key), &file, self.durability)
    }

    fn load_page(&self, id: &PageId) -> Result<(PathBuf, PageFile), FetchError> {
        let path = self.page_path(id);
        let file: PageFile = read_json(&path, || format!("page {id}"))?;
        if file.id != id.as_str() {
            return Err(FetchError::Corrupt {
                path,
                reason: format!("stored id {:?} does not match {id}", file.id),
            });
        }
        Ok((path, file))
    }
}

impl DocumentStore for StoreFolder {
    fn fetch(&self, id: &PageId) -> Result<Document, FetchError> {
        let (_, file) = self.load_page(id)?;
        Ok(Document::new(id.clone(), file.title, file.version, file.body))
    }

    fn write(&self, update: &DocumentUpdate) -> Result<u64, WriteError> {
        let lock = root_write_lock(&self.root);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (path, mut file) = self.load_page(&update.id)?;
        check_increment(file.version, update)?;

        let number = update.version.number;
        file.title = update.title.clone();
        file.version = number;
        file.body = update.body.clone();
        push_history(
            &mut file.history,
            VersionRecord {
                number,
                message: update.version.message.clone(),
                created_at_millis: now_millis(),
            },
        );
        write_json(&path, &file, self.durability)?;
        tracing::debug!(page_id = %update.id, version = number, path = ?path, "store folder wrote page");
        Ok(number)
    }

    fn history(&self, id: &PageId, limit: usize) -> Result<Vec<VersionRecord>, FetchError> {
        let (_, file) = self.load_page(id)?;
        Ok(newest_first(&file.history, limit))
    }
}

impl IssueSource for StoreFolder {
    fn fetch_issue(&self, key: &IssueKey) -> Result<Issue, FetchError> {
        let path = self.issue_path(key);
        let file: IssueFile = read_json(&path, || format!("issue {key}"))?;
        if file.key != key.as_str() {
            return Err(FetchError::Corrupt {
                path,
                reason: format!("stored key {:?} does not match {key}", file.key),
            });
        }
        Ok(Issue { key: key.clone(), description: file.description })
    }
}

// Extracted file IO helpers (atomic writes, JSON decode).
include!("folder/helpers.rs");
