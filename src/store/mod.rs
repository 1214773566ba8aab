// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Document and issue stores.
//!
//! The core never talks to a transport directly; it goes through [`DocumentStore`] and
//! [`IssueSource`]. A store is the only authority on versions: `write` must accept an update
//! only when its version is exactly one above the stored version (compare-and-increment),
//! and reject it with [`WriteError::Conflict`] otherwise.

mod folder;
mod memory;

use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::model::{Document, DocumentUpdate, Issue, IssueKey, PageId, VersionRecord};

pub use folder::{StoreFolder, WriteDurability};
pub use memory::{demo_store, MemoryStore};

/// Version records kept per page.
pub const HISTORY_LIMIT: usize = 64;

pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_CONFLICT: u16 = 409;

pub trait DocumentStore: Send + Sync {
    fn fetch(&self, id: &PageId) -> Result<Document, FetchError>;

    /// Writes the whole document and returns the version it was stored under.
    fn write(&self, update: &DocumentUpdate) -> Result<u64, WriteError>;

    /// Most recent version records, newest first.
    fn history(&self, id: &PageId, limit: usize) -> Result<Vec<VersionRecord>, FetchError>;
}

pub trait IssueSource: Send + Sync {
    fn fetch_issue(&self, key: &IssueKey) -> Result<Issue, FetchError>;
}

#[derive(Debug)]
pub enum FetchError {
    NotFound { resource: String },
    Status { status: u16, detail: String },
    Io { path: PathBuf, source: io::Error },
    Json { path: PathBuf, source: serde_json::Error },
    Corrupt { path: PathBuf, reason: String },
}

impl FetchError {
    /// Classifies a non-success transport response.
    pub fn from_status(status: u16, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        if status == STATUS_NOT_FOUND {
            return Self::NotFound { resource: detail };
        }
        Self::Status { status, detail }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { resource } => write!(f, "{STATUS_NOT_FOUND} ({resource} not found)"),
            Self::Status { status, detail } if detail.is_empty() => write!(f, "{status}"),
            Self::Status { status, detail } => write!(f, "{status} - {detail}"),
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json { path, source } => write!(f, "json error at {path:?}: {source}"),
            Self::Corrupt { path, reason } => write!(f, "corrupt store file {path:?}: {reason}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::NotFound { .. } | Self::Status { .. } | Self::Corrupt { .. } => None,
        }
    }
}

#[derive(Debug)]
pub enum WriteError {
    /// The stored version moved on. `current_version` is set when the store reports it.
    Conflict { current_version: Option<u64> },
    NotFound { resource: String },
    Status { status: u16, detail: String },
    Io { path: PathBuf, source: io::Error },
    Json { path: PathBuf, source: serde_json::Error },
    Corrupt { path: PathBuf, reason: String },
}

impl WriteError {
    /// Classifies a non-success transport response; `409` is a version conflict.
    pub fn from_status(status: u16, detail: impl Into<String>) -> Self {
        match status {
            STATUS_CONFLICT => Self::Conflict { current_version: None },
            _ => Self::Status { status, detail: detail.into() },
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict { current_version: Some(current) } => {
                write!(f, "{STATUS_CONFLICT} (version conflict, current version {current})")
            }
            Self::Conflict { current_version: None } => {
                write!(f, "{STATUS_CONFLICT} (version conflict)")
            }
            Self::NotFound { resource } => write!(f, "{STATUS_NOT_FOUND} ({resource} not found)"),
            Self::Status { status, detail } if detail.is_empty() => write!(f, "{status}"),
            Self::Status { status, detail } => write!(f, "{status} - {detail}"),
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json { path, source } => write!(f, "json error at {path:?}: {source}"),
            Self::Corrupt { path, reason } => write!(f, "corrupt store file {path:?}: {reason}"),
        }
    }
}

impl std::error::Error for WriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<FetchError> for WriteError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::NotFound { resource } => Self::NotFound { resource },
            FetchError::Status { status, detail } => Self::Status { status, detail },
            FetchError::Io { path, source } => Self::Io { path, source },
            FetchError::Json { path, source } => Self::Json { path, source },
            FetchError::Corrupt { path, reason } => Self::Corrupt { path, reason },
        }
    }
}

/// The compare half of compare-and-increment.
fn check_increment(stored_version: u64, update: &DocumentUpdate) -> Result<(), WriteError> {
    if update.version.number == 0 || update.base_version() != stored_version {
        return Err(WriteError::Conflict { current_version: Some(stored_version) });
    }
    Ok(())
}

fn push_history(history: &mut VecDeque<VersionRecord>, record: VersionRecord) {
    history.push_back(record);
    while history.len() > HISTORY_LIMIT {
        history.pop_front();
    }
}

fn newest_first(history: &VecDeque<VersionRecord>, limit: usize) -> Vec<VersionRecord> {
    history.iter().rev().take(limit).cloned().collect()
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{check_increment, FetchError, WriteError};
    use crate::model::{DocumentUpdate, Node, PageId, VersionStamp};

    fn update(number: u64) -> DocumentUpdate {
        DocumentUpdate {
            id: PageId::new("1").expect("page id"),
            title: "T".to_owned(),
            body: Node::doc(Vec::new()),
            version: VersionStamp { number, message: String::new() },
        }
    }

    #[rstest]
    #[case(3, 4, true)]
    #[case(3, 3, false)]
    #[case(3, 5, false)]
    #[case(0, 1, true)]
    #[case(0, 0, false)]
    #[case(u64::MAX, 0, false)]
    fn check_increment_accepts_only_the_next_version(
        #[case] stored: u64,
        #[case] number: u64,
        #[case] accepted: bool,
    ) {
        let result = check_increment(stored, &update(number));
        assert_eq!(result.is_ok(), accepted);
        if let Err(err) = result {
            assert!(matches!(err, WriteError::Conflict { current_version: Some(v) } if v == stored));
        }
    }

    #[rstest]
    #[case(409, true)]
    #[case(400, false)]
    #[case(500, false)]
    fn write_status_classification(#[case] status: u16, #[case] conflict: bool) {
        assert_eq!(WriteError::from_status(status, "body").is_conflict(), conflict);
    }

    #[test]
    fn status_errors_render_code_and_detail() {
        assert_eq!(WriteError::from_status(500, "boom").to_string(), "500 - boom");
        assert_eq!(FetchError::from_status(503, "").to_string(), "503");
        assert!(matches!(FetchError::from_status(404, "page 1"), FetchError::NotFound { .. }));
    }
}
