// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Nereid Wiki CLI entrypoint.
//!
//! By default this serves MCP over streamable HTTP at `http://127.0.0.1:<port>/mcp` until
//! interrupted. Use `--mcp` to serve over stdio instead (intended for tool integrations).

use std::error::Error;
use std::sync::Arc;

use axum::Router;
use nereid_wiki::fragment::{FragmentConvention, SearchDepth, DEFAULT_PREFIX};
use nereid_wiki::mcp::WikiMcp;
use nereid_wiki::scan::FenceScanner;
use nereid_wiki::store::{demo_store, StoreFolder, WriteDurability};
use rmcp::transport::{
    streamable_http_server::session::local::LocalSessionManager, StreamableHttpServerConfig,
    StreamableHttpService,
};

const DEFAULT_MCP_HTTP_PORT: u16 = 27436;
const LOG_ENV: &str = "NEREID_WIKI_LOG";
const DEFAULT_LOG_FILTER: &str = "nereid_wiki=info";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [<store-dir>] [--durable-writes] [--recursive] [--fragment-prefix <prefix>] [--mcp-http-port <port>]\n  {program} [--store <dir>] [--durable-writes] [--recursive] [--fragment-prefix <prefix>] [--mcp-http-port <port>]\n  {program} --demo [--recursive] [--fragment-prefix <prefix>] [--mcp-http-port <port>]\n  {program} [<store-dir>] [--durable-writes] --mcp\n  {program} [--store <dir>] [--durable-writes] --mcp\n  {program} --demo --mcp\n\nBy default MCP is served over streamable HTTP at `http://127.0.0.1:<port>/mcp`.\n--mcp-http-port selects the port (0 = ephemeral; default {DEFAULT_MCP_HTTP_PORT}).\n\nIf store-dir/--store is omitted, the current working directory is used.\n--demo uses a built-in in-memory store and cannot be combined with store-dir/--store.\n\n--durable-writes opts into slower, best-effort durable persistence (fsync/sync where supported).\n--recursive also finds fragments nested inside other blocks.\n--fragment-prefix changes the title prefix that marks a fragment (default {DEFAULT_PREFIX:?}).\n\nLogs go to stderr; set {LOG_ENV} or RUST_LOG to filter (default {DEFAULT_LOG_FILTER:?})."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    mcp: bool,
    demo: bool,
    store_dir: Option<String>,
    mcp_http_port: Option<u16>,
    durable_writes: bool,
    recursive: bool,
    fragment_prefix: Option<String>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--mcp" => {
                if options.mcp {
                    return Err(());
                }
                options.mcp = true;
            }
            "--demo" => {
                if options.demo {
                    return Err(());
                }
                options.demo = true;
            }
            "--store" => {
                if options.store_dir.is_some() {
                    return Err(());
                }
                options.store_dir = Some(args.next().ok_or(())?);
            }
            "--mcp-http-port" => {
                if options.mcp_http_port.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                options.mcp_http_port = Some(raw.parse().map_err(|_| ())?);
            }
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            "--recursive" => {
                if options.recursive {
                    return Err(());
                }
                options.recursive = true;
            }
            "--fragment-prefix" => {
                if options.fragment_prefix.is_some() {
                    return Err(());
                }
                let prefix = args.next().ok_or(())?;
                if prefix.is_empty() {
                    return Err(());
                }
                options.fragment_prefix = Some(prefix);
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.store_dir.is_some() {
                    return Err(());
                }
                options.store_dir = Some(arg);
            }
        }
    }

    if options.demo && (options.store_dir.is_some() || options.durable_writes) {
        return Err(());
    }

    if options.mcp && options.mcp_http_port.is_some() {
        return Err(());
    }

    Ok(options)
}

fn init_logging() {
    let filter = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_owned());
    // stdout carries the stdio MCP transport.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_server(options: &CliOptions) -> Result<WikiMcp, Box<dyn Error>> {
    let mut convention = match options.fragment_prefix.as_deref() {
        Some(prefix) => FragmentConvention::new(prefix),
        None => FragmentConvention::default(),
    };
    if options.recursive {
        convention = convention.with_depth(SearchDepth::Recursive);
    }
    let scanner = FenceScanner::mermaid()?;

    if options.demo {
        tracing::info!("serving the built-in demo store");
        return Ok(WikiMcp::from_store(demo_store(), convention, scanner));
    }

    let dir = options.store_dir.clone().unwrap_or_else(|| ".".to_owned());
    let durability = if options.durable_writes {
        WriteDurability::Durable
    } else {
        WriteDurability::BestEffort
    };
    let folder = StoreFolder::new(dir).with_durability(durability);
    tracing::info!(root = ?folder.root(), ?durability, "serving store folder");
    Ok(WikiMcp::from_store(folder, convention, scanner))
}

async fn serve_http(mcp: WikiMcp, port: u16) -> Result<(), Box<dyn Error>> {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "MCP listening at /mcp");

    let config =
        StreamableHttpServerConfig { stateful_mode: true, ..StreamableHttpServerConfig::default() };
    let shutdown_token = config.cancellation_token.clone();
    let server_shutdown = shutdown_token.clone();

    let session_manager = Arc::new(LocalSessionManager::default());
    let mcp_service = StreamableHttpService::new(move || Ok(mcp.clone()), session_manager, config);

    let router = Router::new().nest_service("/mcp", mcp_service);
    let server_handle = tokio::spawn(async move {
        let serve = axum::serve(listener, router).with_graceful_shutdown(async move {
            server_shutdown.cancelled().await;
        });
        if let Err(err) = serve.await {
            tracing::error!(error = %err, "MCP HTTP server error");
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    shutdown_token.cancel();
    let _ = server_handle.await;
    Ok(())
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "nereid-wiki".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        init_logging();
        let mcp = build_server(&options)?;
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

        if options.mcp {
            runtime.block_on(mcp.serve_stdio())?;
            return Ok(());
        }

        let port = options.mcp_http_port.unwrap_or(DEFAULT_MCP_HTTP_PORT);
        runtime.block_on(serve_http(mcp, port))
    })();

    if let Err(err) = result {
        eprintln!("nereid-wiki: {err}");
        std::process::exit(1);
    }
}
