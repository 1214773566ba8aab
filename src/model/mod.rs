// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model: validated ids, the document node tree, and page/issue values.

pub mod document;
pub(crate) mod fixtures;
pub mod ids;
pub mod node;

pub use document::{Document, DocumentUpdate, Issue, VersionRecord, VersionStamp};
pub use ids::{
    FragmentName, Id, IdKind, IssueKey, PageId, ValidationError, FRAGMENT_NAME_MAX_UNITS,
};
pub use node::{Attrs, Element, Node, TextNode};
