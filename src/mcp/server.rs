// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::{Json, Parameters};
use rmcp::model::{ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ErrorData, ServerHandler, ServiceExt};

use crate::fragment::FragmentConvention;
use crate::resolver::{self, ResolveError};
use crate::scan::FenceScanner;
use crate::store::{DocumentStore, IssueSource};

use super::types::*;

#[derive(Clone)]
pub struct WikiMcp {
    pages: Arc<dyn DocumentStore>,
    issues: Arc<dyn IssueSource>,
    convention: Arc<FragmentConvention>,
    scanner: Arc<FenceScanner>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl WikiMcp {
    pub fn new(
        pages: Arc<dyn DocumentStore>,
        issues: Arc<dyn IssueSource>,
        convention: FragmentConvention,
        scanner: FenceScanner,
    ) -> Self {
        Self {
            pages,
            issues,
            convention: Arc::new(convention),
            scanner: Arc::new(scanner),
            tool_router: Self::tool_router(),
        }
    }

    /// Serves pages and issues from one store.
    pub fn from_store<S>(store: S, convention: FragmentConvention, scanner: FenceScanner) -> Self
    where
        S: DocumentStore + IssueSource + 'static,
    {
        let store = Arc::new(store);
        Self::new(store.clone(), store, convention, scanner)
    }

    pub async fn serve_stdio(self) -> Result<(), rmcp::RmcpError> {
        let service = self.serve((tokio::io::stdin(), tokio::io::stdout())).await?;
        service.waiting().await?;
        Ok(())
    }

    /// Read a page's title, version, and raw body JSON.
    #[tool(name = "page.get")]
    async fn page_get(
        &self,
        params: Parameters<PageIdParams>,
    ) -> Result<Json<PageGetResponse>, ErrorData> {
        let PageIdParams { page_id } = params.0;
        let response = match resolver::get_page(self.pages.as_ref(), &page_id) {
            Ok(page) => PageGetResponse {
                ok: true,
                content: Some(page.content),
                title: Some(page.title),
                version: Some(page.version),
                error: None,
            },
            Err(err) => PageGetResponse { error: Some(err.to_string()), ..Default::default() },
        };
        Ok(Json(response))
    }

    /// List the most recent versions of a page, newest first.
    #[tool(name = "page.history")]
    async fn page_history(
        &self,
        params: Parameters<PageIdParams>,
    ) -> Result<Json<PageHistoryResponse>, ErrorData> {
        let PageIdParams { page_id } = params.0;
        let response = match resolver::page_history(self.pages.as_ref(), &page_id) {
            Ok(records) => PageHistoryResponse {
                ok: true,
                versions: Some(records.into_iter().map(version_to_mcp).collect()),
                error: None,
            },
            Err(err) => PageHistoryResponse { error: Some(err.to_string()), ..Default::default() },
        };
        Ok(Json(response))
    }

    /// List the diagram fragments on a page in document order.
    #[tool(name = "fragment.list")]
    async fn fragment_list(
        &self,
        params: Parameters<PageIdParams>,
    ) -> Result<Json<FragmentListResponse>, ErrorData> {
        let PageIdParams { page_id } = params.0;
        let response =
            match resolver::list_fragments(self.pages.as_ref(), &page_id, &self.convention) {
                Ok(listing) => FragmentListResponse {
                    ok: true,
                    fragments: Some(listing.fragments.into_iter().map(fragment_to_mcp).collect()),
                    version: Some(listing.version),
                    error: None,
                },
                Err(err) => {
                    FragmentListResponse { error: Some(err.to_string()), ..Default::default() }
                }
            };
        Ok(Json(response))
    }

    /// Read one fragment's source and the page version to pass back on `fragment.write`.
    #[tool(name = "fragment.read")]
    async fn fragment_read(
        &self,
        params: Parameters<FragmentReadParams>,
    ) -> Result<Json<FragmentReadResponse>, ErrorData> {
        let FragmentReadParams { page_id, name } = params.0;
        let result = resolver::read_fragment(
            self.pages.as_ref(),
            &page_id,
            name.as_deref(),
            &self.convention,
        );
        let response = match result {
            Ok(snapshot) => FragmentReadResponse {
                ok: true,
                found: Some(snapshot.source.is_some()),
                source: Some(snapshot.source),
                version: Some(snapshot.version),
                error: None,
            },
            Err(err) => FragmentReadResponse { error: Some(err.to_string()), ..Default::default() },
        };
        Ok(Json(response))
    }

    /// Replace one fragment's source; on conflict, re-read and retry with the new version.
    #[tool(name = "fragment.write")]
    async fn fragment_write(
        &self,
        params: Parameters<FragmentWriteParams>,
    ) -> Result<Json<FragmentWriteResponse>, ErrorData> {
        let FragmentWriteParams { page_id, name, source, current_version } = params.0;
        let result = resolver::write_fragment(
            self.pages.as_ref(),
            &page_id,
            name.as_deref(),
            &source,
            current_version,
            &self.convention,
        );
        let response = match result {
            Ok(new_version) => {
                FragmentWriteResponse { ok: true, new_version: Some(new_version), ..Default::default() }
            }
            Err(err) => write_failure(&err),
        };
        Ok(Json(response))
    }

    /// Find fenced diagram blocks in an issue description.
    #[tool(name = "issue.diagrams")]
    async fn issue_diagrams(
        &self,
        params: Parameters<IssueParams>,
    ) -> Result<Json<IssueDiagramsResponse>, ErrorData> {
        let IssueParams { issue_key } = params.0;
        let response = match resolver::issue_diagrams(self.issues.as_ref(), &issue_key, &self.scanner)
        {
            Ok(found) => IssueDiagramsResponse {
                ok: true,
                key: Some(found.key.into_string()),
                description: Some(found.description),
                diagrams: Some(found.diagrams.into_iter().map(diagram_to_mcp).collect()),
                error: None,
            },
            Err(err) => {
                IssueDiagramsResponse { error: Some(err.to_string()), ..Default::default() }
            }
        };
        Ok(Json(response))
    }
}

#[tool_handler]
impl ServerHandler for WikiMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Wiki diagram fragment server (tools: page.get, page.history, fragment.list, fragment.read, fragment.write, issue.diagrams). Read a fragment first and pass its version as current_version when writing."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// Mapping helpers from resolver results to tool payloads.
include!("server/helpers.rs");
