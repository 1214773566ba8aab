// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Nereid Wiki: named diagram fragments inside wiki page trees.
//!
//! Pages are JSON document trees; a diagram lives in a labeled `expand` block whose title
//! starts with `mermaid:`. The crate reads and rewrites those fragments under optimistic
//! version control and serves the operations over MCP.

pub mod fragment;
pub mod mcp;
pub mod model;
pub mod ops;
pub mod resolver;
pub mod scan;
pub mod store;
