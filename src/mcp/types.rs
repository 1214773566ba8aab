// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Tool parameters and tagged results.
//!
//! Results never surface as protocol errors: every response carries `ok`, and failures fill
//! in `error` (plus `conflict`/`server_version` for version conflicts).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PageIdParams {
    /// Numeric page id, e.g. `"12345"`.
    pub page_id: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FragmentReadParams {
    pub page_id: String,
    /// Fragment name; omit to target the first fragment on the page.
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FragmentWriteParams {
    pub page_id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// New fragment source. An empty string clears the fragment.
    pub source: String,
    /// Version the source was read at. Omit to skip the local version check.
    #[serde(default)]
    pub current_version: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct IssueParams {
    /// Issue key, e.g. `"PROJ-123"`.
    pub issue_key: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PageGetResponse {
    pub ok: bool,
    /// Page body as a JSON string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpVersion {
    pub number: u64,
    pub message: String,
    pub created_at_millis: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PageHistoryResponse {
    pub ok: bool,
    /// Newest first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versions: Option<Vec<McpVersion>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpFragment {
    /// Empty for the default fragment.
    pub name: String,
    pub source: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FragmentListResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragments: Option<Vec<McpFragment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FragmentReadResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub found: Option<bool>,
    /// Set on every successful read; the inner `None` goes out as `"source": null`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Option<String>>,
    /// Pass back as `current_version` when writing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FragmentWriteResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_version: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_version: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpDiagram {
    pub id: usize,
    pub source: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct IssueDiagramsResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagrams: Option<Vec<McpDiagram>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
