// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Boundary operations.
//!
//! Each operation validates caller input before touching a collaborator, then translates
//! every failure into a [`ResolveError`] whose `Display` is the user-facing message.

use std::fmt;

use crate::fragment::{self, FragmentConvention, FragmentSummary};
use crate::model::{FragmentName, IssueKey, PageId, ValidationError, VersionRecord};
use crate::ops::{commit_fragment, ConflictSource, FragmentUpdate, UpdateError};
use crate::scan::{flatten_description, FenceScanner, LooseFragment};
use crate::store::{DocumentStore, FetchError, IssueSource, WriteError};

/// Version records returned by [`page_history`].
pub const PAGE_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTarget {
    Page,
    History,
    Issue,
}

impl FetchTarget {
    fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::History => "history",
            Self::Issue => "issue",
        }
    }
}

#[derive(Debug)]
pub enum ResolveError {
    Validation(ValidationError),
    Fetch { target: FetchTarget, source: FetchError },
    Conflict { detected_by: ConflictSource, server_version: Option<u64> },
    Commit(WriteError),
}

impl ResolveError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    pub fn server_version(&self) -> Option<u64> {
        match self {
            Self::Conflict { server_version, .. } => *server_version,
            _ => None,
        }
    }

    fn fetch(target: FetchTarget) -> impl FnOnce(FetchError) -> Self {
        move |source| Self::Fetch { target, source }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Fetch { target, source } => {
                write!(f, "Failed to fetch {}: {source}", target.as_str())
            }
            Self::Conflict { detected_by: ConflictSource::Precheck, .. } => f.write_str(
                "Page has been modified by another user. Please refresh and try again.",
            ),
            Self::Conflict { detected_by: ConflictSource::Store, .. } => {
                f.write_str("Page was modified while saving. Please refresh and try again.")
            }
            Self::Commit(err) => write!(f, "Failed to update page: {err}"),
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Fetch { source, .. } => Some(source),
            Self::Commit(err) => Some(err),
            Self::Conflict { .. } => None,
        }
    }
}

impl From<ValidationError> for ResolveError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<UpdateError> for ResolveError {
    fn from(err: UpdateError) -> Self {
        match err {
            UpdateError::Fetch(source) => Self::Fetch { target: FetchTarget::Page, source },
            UpdateError::Conflict { detected_by, server_version, .. } => {
                Self::Conflict { detected_by, server_version }
            }
            UpdateError::Commit(err) => Self::Commit(err),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageContent {
    /// The page body as a JSON string.
    pub content: String,
    pub title: String,
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentSnapshot {
    /// `None` when no fragment matched.
    pub source: Option<String>,
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentListing {
    pub fragments: Vec<FragmentSummary>,
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueDiagrams {
    pub key: IssueKey,
    pub description: String,
    pub diagrams: Vec<LooseFragment>,
}

fn parse_name(name: Option<&str>) -> Result<Option<FragmentName>, ValidationError> {
    name.map(FragmentName::new).transpose()
}

pub fn get_page<S: DocumentStore + ?Sized>(
    store: &S,
    page_id: &str,
) -> Result<PageContent, ResolveError> {
    let page_id = PageId::new(page_id)?;
    let document = store.fetch(&page_id).map_err(ResolveError::fetch(FetchTarget::Page))?;
    Ok(PageContent {
        content: document.body().to_value().to_string(),
        title: document.title().to_owned(),
        version: document.version(),
    })
}

/// Reads one fragment's source together with the version it was read at.
///
/// The version is the token for a later [`write_fragment`].
pub fn read_fragment<S: DocumentStore + ?Sized>(
    store: &S,
    page_id: &str,
    name: Option<&str>,
    convention: &FragmentConvention,
) -> Result<FragmentSnapshot, ResolveError> {
    let page_id = PageId::new(page_id)?;
    let name = parse_name(name)?;
    let document = store.fetch(&page_id).map_err(ResolveError::fetch(FetchTarget::Page))?;
    let source = fragment::read_fragment(document.body(), name.as_ref(), convention);
    if source.is_none() {
        tracing::debug!(%page_id, ?name, "no fragment matched");
    }
    Ok(FragmentSnapshot { source, version: document.version() })
}

/// Replaces one fragment and returns the page's new version.
///
/// An empty `source` is valid and clears the fragment.
pub fn write_fragment<S: DocumentStore + ?Sized>(
    store: &S,
    page_id: &str,
    name: Option<&str>,
    source: &str,
    current_version: Option<u64>,
    convention: &FragmentConvention,
) -> Result<u64, ResolveError> {
    let update = FragmentUpdate {
        page_id: PageId::new(page_id)?,
        name: parse_name(name)?,
        source: source.to_owned(),
        expected_version: current_version,
    };
    let committed = commit_fragment(store, &update, convention)?;
    Ok(committed.new_version)
}

/// The most recent version records, newest first.
pub fn page_history<S: DocumentStore + ?Sized>(
    store: &S,
    page_id: &str,
) -> Result<Vec<VersionRecord>, ResolveError> {
    let page_id = PageId::new(page_id)?;
    store
        .history(&page_id, PAGE_HISTORY_LIMIT)
        .map_err(ResolveError::fetch(FetchTarget::History))
}

pub fn list_fragments<S: DocumentStore + ?Sized>(
    store: &S,
    page_id: &str,
    convention: &FragmentConvention,
) -> Result<FragmentListing, ResolveError> {
    let page_id = PageId::new(page_id)?;
    let document = store.fetch(&page_id).map_err(ResolveError::fetch(FetchTarget::Page))?;
    Ok(FragmentListing {
        fragments: fragment::list_fragments(document.body(), convention),
        version: document.version(),
    })
}

/// Flattens an issue description and scans it for fenced fragments.
pub fn issue_diagrams<I: IssueSource + ?Sized>(
    issues: &I,
    issue_key: &str,
    scanner: &FenceScanner,
) -> Result<IssueDiagrams, ResolveError> {
    let key = IssueKey::new(issue_key)?;
    let issue = issues.fetch_issue(&key).map_err(ResolveError::fetch(FetchTarget::Issue))?;
    let description = issue
        .description
        .as_ref()
        .map(|root| flatten_description(root, scanner.language()))
        .unwrap_or_default();
    let diagrams = scanner.scan(&description);
    Ok(IssueDiagrams { key, description, diagrams })
}
