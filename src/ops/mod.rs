// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Version-guarded fragment updates.
//!
//! An update is read → guard → replace → write. Concurrency is optimistic and checked twice:
//! the [`VersionGuard`] compares the caller's token against the freshly fetched version (a
//! cheap early check, racy by nature), and the store's compare-and-increment on write is the
//! authoritative one. Neither retries; conflicts go back to the caller.

use std::fmt;

use crate::fragment::{replace_fragment, FragmentConvention};
use crate::model::{DocumentUpdate, FragmentName, PageId, VersionStamp};
use crate::store::{DocumentStore, FetchError, WriteError};

/// Local precondition on the document version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionGuard {
    /// No token supplied: the write is always attempted.
    Unchecked,
    Checked { expected: u64 },
}

impl VersionGuard {
    pub fn new(expected: Option<u64>) -> Self {
        match expected {
            Some(expected) => Self::Checked { expected },
            None => Self::Unchecked,
        }
    }

    pub fn expected(&self) -> Option<u64> {
        match self {
            Self::Unchecked => None,
            Self::Checked { expected } => Some(*expected),
        }
    }

    pub fn check(&self, current: u64) -> Result<(), VersionConflict> {
        match *self {
            Self::Checked { expected } if expected != current => {
                Err(VersionConflict { expected, current })
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionConflict {
    pub expected: u64,
    pub current: u64,
}

/// A request to replace one fragment's source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentUpdate {
    pub page_id: PageId,
    /// `None` targets the first fragment on the page.
    pub name: Option<FragmentName>,
    pub source: String,
    /// The caller's last known version; `None` skips the local check.
    pub expected_version: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Committed {
    /// Version the page now has. Callers must use it as their next token.
    pub new_version: u64,
    /// `false` when no fragment matched and the page was written back unchanged.
    pub fragment_found: bool,
}

/// Which of the two checks caught a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictSource {
    /// The version token did not match the fetched page; nothing was written.
    Precheck,
    /// The store rejected the write because the page changed after it was fetched.
    Store,
}

#[derive(Debug)]
pub enum UpdateError {
    Fetch(FetchError),
    Conflict {
        detected_by: ConflictSource,
        expected: Option<u64>,
        /// The store's current version, when known.
        server_version: Option<u64>,
    },
    Commit(WriteError),
}

impl UpdateError {
    /// Conflicts are recoverable by re-fetching; other failures are not.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    pub fn server_version(&self) -> Option<u64> {
        match self {
            Self::Conflict { server_version, .. } => *server_version,
            Self::Fetch(_) | Self::Commit(_) => None,
        }
    }
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(err) => write!(f, "Failed to fetch page: {err}"),
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

impl std::error::Error for UpdateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch(err) => Some(err),
            Self::Commit(err) => Some(err),
            Self::Conflict { .. } => None,
        }
    }
}

pub fn commit_message(name: Option<&FragmentName>) -> String {
    format!("Updated Mermaid diagram: {}", name.map_or("default", FragmentName::as_str))
}

/// Replaces one fragment and writes the page back, guarded by the page version.
///
/// The page is fetched fresh; the write carries the fetched version plus one, so a store
/// that enforces compare-and-increment rejects it if anyone else wrote in between.
pub fn commit_fragment<S: DocumentStore + ?Sized>(
    store: &S,
    update: &FragmentUpdate,
    convention: &FragmentConvention,
) -> Result<Committed, UpdateError> {
    let page_id = &update.page_id;
    let document = store.fetch(page_id).map_err(UpdateError::Fetch)?;
    let base_version = document.version();

    if let Err(conflict) = VersionGuard::new(update.expected_version).check(base_version) {
        tracing::warn!(
            %page_id,
            expected = conflict.expected,
            current = conflict.current,
            "stale version token, write skipped"
        );
        return Err(UpdateError::Conflict {
            detected_by: ConflictSource::Precheck,
            expected: Some(conflict.expected),
            server_version: Some(conflict.current),
        });
    }

    let replacement =
        replace_fragment(document.body(), update.name.as_ref(), &update.source, convention);
    if !replacement.replaced {
        tracing::debug!(%page_id, name = ?update.name, "no fragment matched, page written unchanged");
    }

    let new_version = base_version.saturating_add(1);
    let write = DocumentUpdate {
        id: page_id.clone(),
        title: document.title().to_owned(),
        body: replacement.root,
        version: VersionStamp {
            number: new_version,
            message: commit_message(update.name.as_ref()),
        },
    };

    match store.write(&write) {
        Ok(stored) => {
            if stored != new_version {
                tracing::warn!(%page_id, expected = new_version, stored, "store reported an unexpected version");
            }
            tracing::info!(%page_id, version = new_version, "fragment committed");
            Ok(Committed { new_version, fragment_found: replacement.replaced })
        }
        Err(WriteError::Conflict { current_version }) => {
            tracing::warn!(%page_id, base_version, ?current_version, "store rejected write");
            Err(UpdateError::Conflict {
                detected_by: ConflictSource::Store,
                expected: update.expected_version,
                server_version: current_version,
            })
        }
        Err(err) => {
            tracing::warn!(%page_id, error = %err, "write failed");
            Err(UpdateError::Commit(err))
        }
    }
}

#[cfg(test)]
mod tests;
