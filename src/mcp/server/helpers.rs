// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

fn version_to_mcp(record: crate::model::VersionRecord) -> McpVersion {
    McpVersion {
        number: record.number,
        message: record.message,
        created_at_millis: record.created_at_millis,
    }
}

fn fragment_to_mcp(summary: crate::fragment::FragmentSummary) -> McpFragment {
    McpFragment { name: summary.name, source: summary.source }
}

fn diagram_to_mcp(fragment: crate::scan::LooseFragment) -> McpDiagram {
    McpDiagram { id: fragment.id, source: fragment.source }
}

fn write_failure(err: &ResolveError) -> FragmentWriteResponse {
    FragmentWriteResponse {
        ok: false,
        new_version: None,
        error: Some(err.to_string()),
        conflict: err.is_conflict().then_some(true),
        server_version: err.server_version(),
    }
}
