// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::model::fixtures::{demo_issue, flow_page, multi_fragment_page};
use crate::model::{Document, DocumentUpdate, Issue, IssueKey, PageId, VersionRecord};

use super::{
    check_increment, newest_first, now_millis, push_history, DocumentStore, FetchError,
    IssueSource, WriteError,
};

#[derive(Debug)]
struct StoredPage {
    document: Document,
    history: VecDeque<VersionRecord>,
}

#[derive(Debug, Default)]
struct MemoryState {
    pages: BTreeMap<PageId, StoredPage>,
    issues: BTreeMap<IssueKey, Issue>,
}

/// In-process store. Compare-and-increment happens under one lock, so concurrent writers
/// in the same process cannot both win.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts or replaces a page as-is, resetting its history to the given version.
    pub fn insert_page(&self, document: Document) {
        let record = VersionRecord {
            number: document.version(),
            message: "Imported".to_owned(),
            created_at_millis: now_millis(),
        };
        let mut history = VecDeque::new();
        history.push_back(record);
        self.lock().pages.insert(document.id().clone(), StoredPage { document, history });
    }

    pub fn insert_issue(&self, issue: Issue) {
        self.lock().issues.insert(issue.key.clone(), issue);
    }

    pub fn page(&self, id: &PageId) -> Option<Document> {
        self.lock().pages.get(id).map(|stored| stored.document.clone())
    }
}

impl DocumentStore for MemoryStore {
    fn fetch(&self, id: &PageId) -> Result<Document, FetchError> {
        self.page(id).ok_or_else(|| FetchError::NotFound { resource: format!("page {id}") })
    }

    fn write(&self, update: &DocumentUpdate) -> Result<u64, WriteError> {
        let mut state = self.lock();
        let Some(stored) = state.pages.get_mut(&update.id) else {
            return Err(WriteError::NotFound { resource: format!("page {}", update.id) });
        };
        check_increment(stored.document.version(), update)?;

        let number = update.version.number;
        stored.document =
            Document::new(update.id.clone(), update.title.clone(), number, update.body.clone());
        push_history(
            &mut stored.history,
            VersionRecord {
                number,
                message: update.version.message.clone(),
                created_at_millis: now_millis(),
            },
        );
        tracing::debug!(page_id = %update.id, version = number, "memory store wrote page");
        Ok(number)
    }

    fn history(&self, id: &PageId, limit: usize) -> Result<Vec<VersionRecord>, FetchError> {
        let state = self.lock();
        let stored = state
            .pages
            .get(id)
            .ok_or_else(|| FetchError::NotFound { resource: format!("page {id}") })?;
        Ok(newest_first(&stored.history, limit))
    }
}

impl IssueSource for MemoryStore {
    fn fetch_issue(&self, key: &IssueKey) -> Result<Issue, FetchError> {
        self.lock()
            .issues
            .get(key)
            .cloned()
            .ok_or_else(|| FetchError::NotFound { resource: format!("issue {key}") })
    }
}

/// A store preloaded with sample pages (`12345`, `777`) and issue `DEMO-1`.
pub fn demo_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.insert_page(flow_page());
    store.insert_page(multi_fragment_page());
    store.insert_issue(demo_issue());
    store
}
