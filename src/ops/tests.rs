// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::atomic::{AtomicUsize, Ordering};

use rstest::{fixture, rstest};

use crate::fragment::{read_fragment, FragmentConvention, SearchDepth};
use crate::model::fixtures::{flow_page, multi_fragment_page};
use crate::model::{
    Document, DocumentUpdate, FragmentName, PageId, VersionRecord, VersionStamp,
};
use crate::store::{DocumentStore, FetchError, MemoryStore, WriteError};

use super::{
    commit_fragment, commit_message, Committed, ConflictSource, FragmentUpdate, UpdateError,
    VersionConflict, VersionGuard,
};

fn page_id(value: &str) -> PageId {
    PageId::new(value).expect("page id")
}

fn name(value: &str) -> FragmentName {
    FragmentName::new(value).expect("fragment name")
}

fn update(page: &str, fragment: Option<&str>, source: &str, expected: Option<u64>) -> FragmentUpdate {
    FragmentUpdate {
        page_id: page_id(page),
        name: fragment.map(name),
        source: source.to_owned(),
        expected_version: expected,
    }
}

/// Counts writes reaching the wrapped store.
#[derive(Debug, Default)]
struct CountingStore {
    inner: MemoryStore,
    writes: AtomicUsize,
}

impl CountingStore {
    fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl DocumentStore for CountingStore {
    fn fetch(&self, id: &PageId) -> Result<Document, FetchError> {
        self.inner.fetch(id)
    }

    fn write(&self, update: &DocumentUpdate) -> Result<u64, WriteError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.write(update)
    }

    fn history(&self, id: &PageId, limit: usize) -> Result<Vec<VersionRecord>, FetchError> {
        self.inner.history(id, limit)
    }
}

/// Lets another writer land between every fetch and the following write.
#[derive(Debug, Default)]
struct RacingStore {
    inner: MemoryStore,
}

impl DocumentStore for RacingStore {
    fn fetch(&self, id: &PageId) -> Result<Document, FetchError> {
        let document = self.inner.fetch(id)?;
        let intruder = DocumentUpdate {
            id: id.clone(),
            title: document.title().to_owned(),
            body: document.body().clone(),
            version: VersionStamp { number: document.version() + 1, message: "intruder".into() },
        };
        self.inner.write(&intruder).expect("intruding write");
        Ok(document)
    }

    fn write(&self, update: &DocumentUpdate) -> Result<u64, WriteError> {
        self.inner.write(update)
    }

    fn history(&self, id: &PageId, limit: usize) -> Result<Vec<VersionRecord>, FetchError> {
        self.inner.history(id, limit)
    }
}

/// Serves pages but refuses every write with a server error.
#[derive(Debug, Default)]
struct BrokenWriteStore {
    inner: MemoryStore,
}

impl DocumentStore for BrokenWriteStore {
    fn fetch(&self, id: &PageId) -> Result<Document, FetchError> {
        self.inner.fetch(id)
    }

    fn write(&self, _update: &DocumentUpdate) -> Result<u64, WriteError> {
        Err(WriteError::from_status(500, "Internal Server Error"))
    }

    fn history(&self, id: &PageId, limit: usize) -> Result<Vec<VersionRecord>, FetchError> {
        self.inner.history(id, limit)
    }
}

#[fixture]
fn store() -> CountingStore {
    let store = CountingStore::default();
    store.inner.insert_page(flow_page());
    store.inner.insert_page(multi_fragment_page());
    store
}

#[fixture]
fn convention() -> FragmentConvention {
    FragmentConvention::default()
}

#[rstest]
#[case(None, 0, true)]
#[case(None, 41, true)]
#[case(Some(3), 3, true)]
#[case(Some(0), 0, true)]
#[case(Some(2), 3, false)]
#[case(Some(4), 3, false)]
#[case(Some(0), 1, false)]
fn guard_passes_only_without_token_or_on_exact_match(
    #[case] expected: Option<u64>,
    #[case] current: u64,
    #[case] passes: bool,
) {
    let guard = VersionGuard::new(expected);
    assert_eq!(guard.expected(), expected);
    assert_eq!(guard.check(current).is_ok(), passes);
}

#[test]
fn guard_reports_both_versions() {
    let err = VersionGuard::Checked { expected: 2 }.check(3).expect_err("conflict");
    assert_eq!(err, VersionConflict { expected: 2, current: 3 });
}

#[rstest]
#[case(Some("flow"), "Updated Mermaid diagram: flow")]
#[case(None, "Updated Mermaid diagram: default")]
fn commit_message_names_the_fragment(#[case] fragment: Option<&str>, #[case] expected: &str) {
    let fragment = fragment.map(name);
    assert_eq!(commit_message(fragment.as_ref()), expected);
}

#[rstest]
fn commit_writes_new_source_and_bumps_version(
    store: CountingStore,
    convention: FragmentConvention,
) {
    let request = update("12345", Some("flow"), "graph LR; X-->Y", Some(3));
    let committed = commit_fragment(&store, &request, &convention).expect("commit");
    assert_eq!(committed, Committed { new_version: 4, fragment_found: true });
    assert_eq!(store.writes(), 1);

    let page = store.fetch(&page_id("12345")).expect("fetch");
    assert_eq!(page.version(), 4);
    assert_eq!(page.title(), "Flow page");
    assert_eq!(
        read_fragment(page.body(), Some(&name("flow")), &convention).as_deref(),
        Some("graph LR; X-->Y")
    );

    let history = store.history(&page_id("12345"), 1).expect("history");
    assert_eq!(history[0].number, 4);
    assert_eq!(history[0].message, "Updated Mermaid diagram: flow");
}

#[rstest]
fn stale_token_conflicts_without_writing(store: CountingStore, convention: FragmentConvention) {
    let request = update("12345", Some("flow"), "graph LR; X-->Y", Some(2));
    let err = commit_fragment(&store, &request, &convention).expect_err("conflict");

    assert!(err.is_conflict());
    assert_eq!(err.server_version(), Some(3));
    assert!(matches!(
        err,
        UpdateError::Conflict { detected_by: ConflictSource::Precheck, expected: Some(2), .. }
    ));
    assert_eq!(
        err.to_string(),
        "Page has been modified by another user. Please refresh and try again."
    );
    assert_eq!(store.writes(), 0);
    assert_eq!(store.fetch(&page_id("12345")).expect("fetch").version(), 3);
}

#[rstest]
fn missing_token_skips_the_local_check(store: CountingStore, convention: FragmentConvention) {
    let request = update("777", Some("seq"), "sequenceDiagram\nB->>A: bye", None);
    let committed = commit_fragment(&store, &request, &convention).expect("commit");
    assert_eq!(committed.new_version, 13);
    assert_eq!(store.writes(), 1);
}

#[rstest]
fn concurrent_write_is_caught_by_the_store(convention: FragmentConvention) {
    let store = RacingStore::default();
    store.inner.insert_page(flow_page());

    let request = update("12345", Some("flow"), "graph LR; X-->Y", Some(3));
    let err = commit_fragment(&store, &request, &convention).expect_err("conflict");

    assert!(matches!(
        err,
        UpdateError::Conflict { detected_by: ConflictSource::Store, expected: Some(3), .. }
    ));
    assert_eq!(err.server_version(), Some(4));
    assert_eq!(err.to_string(), "Page was modified while saving. Please refresh and try again.");

    let page = store.inner.fetch(&page_id("12345")).expect("fetch");
    assert_eq!(
        read_fragment(page.body(), Some(&name("flow")), &convention).as_deref(),
        Some("graph TD; A-->B")
    );
}

#[rstest]
fn write_failure_is_not_a_conflict(convention: FragmentConvention) {
    let store = BrokenWriteStore::default();
    store.inner.insert_page(flow_page());

    let request = update("12345", None, "graph LR; X-->Y", Some(3));
    let err = commit_fragment(&store, &request, &convention).expect_err("failure");

    assert!(!err.is_conflict());
    assert!(matches!(err, UpdateError::Commit(WriteError::Status { status: 500, .. })));
    assert_eq!(err.to_string(), "Failed to update page: 500 - Internal Server Error");
}

#[rstest]
fn missing_page_fails_before_any_write(store: CountingStore, convention: FragmentConvention) {
    let request = update("999", None, "graph TD", None);
    let err = commit_fragment(&store, &request, &convention).expect_err("missing");
    assert!(matches!(err, UpdateError::Fetch(FetchError::NotFound { .. })));
    assert!(err.to_string().starts_with("Failed to fetch page: 404"));
    assert_eq!(store.writes(), 0);
}

#[rstest]
fn unmatched_name_still_commits_unchanged_body(
    store: CountingStore,
    convention: FragmentConvention,
) {
    let before = store.fetch(&page_id("12345")).expect("fetch");
    let request = update("12345", Some("absent"), "graph TD", Some(3));
    let committed = commit_fragment(&store, &request, &convention).expect("commit");

    assert_eq!(committed, Committed { new_version: 4, fragment_found: false });
    let after = store.fetch(&page_id("12345")).expect("fetch");
    assert_eq!(after.body(), before.body());
}

#[rstest]
fn repeating_a_commit_with_fresh_tokens_is_stable(
    store: CountingStore,
    convention: FragmentConvention,
) {
    let first = update("777", Some("seq"), "sequenceDiagram\nB->>A: bye", Some(12));
    let committed = commit_fragment(&store, &first, &convention).expect("first");
    let body_after_first = store.fetch(&page_id("777")).expect("fetch").body().clone();

    let second = FragmentUpdate { expected_version: Some(committed.new_version), ..first };
    let committed = commit_fragment(&store, &second, &convention).expect("second");
    assert_eq!(committed.new_version, 14);

    let page = store.fetch(&page_id("777")).expect("fetch");
    assert_eq!(page.body(), &body_after_first);
}

#[rstest]
fn default_name_targets_the_first_fragment(store: CountingStore, convention: FragmentConvention) {
    let request = update("777", None, "graph TD; only-->first", Some(12));
    commit_fragment(&store, &request, &convention).expect("commit");

    let page = store.fetch(&page_id("777")).expect("fetch");
    assert_eq!(
        read_fragment(page.body(), None, &convention).as_deref(),
        Some("graph TD; only-->first")
    );
    assert_eq!(
        read_fragment(page.body(), Some(&name("seq")), &convention).as_deref(),
        Some("sequenceDiagram\nA->>B: hi")
    );
}

#[rstest]
fn nested_fragments_need_recursive_search(store: CountingStore) {
    let top_level = FragmentConvention::default();
    let request = update("777", Some("nested"), "graph LR; Y-->X", Some(12));
    let committed = commit_fragment(&store, &request, &top_level).expect("commit");
    assert!(!committed.fragment_found);

    let recursive = FragmentConvention::default().with_depth(SearchDepth::Recursive);
    let request = FragmentUpdate { expected_version: Some(committed.new_version), ..request };
    let committed = commit_fragment(&store, &request, &recursive).expect("commit");
    assert!(committed.fragment_found);

    let page = store.fetch(&page_id("777")).expect("fetch");
    assert_eq!(
        read_fragment(page.body(), Some(&name("nested")), &recursive).as_deref(),
        Some("graph LR; Y-->X")
    );
}
