//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api;
use crate::client::QueryClient;
use crate::config::Config;
use crate::server::{LineServer, shutdown_signal};
use crate::state::AppState;
use crate::telemetry::TracingTrace;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tagdb_core::{QueryEngine, Store, TagDbError};
use tokio::io::AsyncBufReadExt;

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum query file size for `exec` (10 MB).
const MAX_EXEC_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// How long `client` waits for an unannounced greeting.
const GREETING_WAIT: Duration = Duration::from_millis(250);

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), TagDbError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| TagDbError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(TagDbError::IoError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Fresh shared state for a server command.
fn build_state(config: &Config) -> AppState {
    AppState::new(
        Store::new(config.store.owner.clone()),
        QueryEngine::new(Arc::new(TracingTrace)),
    )
}

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Start the TCP line server.
pub async fn cmd_serve(
    mut config: Config,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), TagDbError> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    let addr = config.server_addr();

    println!("tagdb Line Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Address:         {}", addr);
    println!("  Owner:           {}", config.store.owner);
    println!("  Max query bytes: {}", config.server.max_query_bytes);
    println!(
        "  Remote shutdown: {}",
        if config.server.allow_remote_shutdown {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let state = build_state(&config);
    let server = LineServer::bind(&addr, state, config.server.clone()).await?;
    server.run(shutdown_signal()).await
}

// =============================================================================
// HTTP COMMAND
// =============================================================================

/// Start the HTTP API server.
pub async fn cmd_http(
    mut config: Config,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), TagDbError> {
    if let Some(host) = host {
        config.http.host = host;
    }
    if let Some(port) = port {
        config.http.port = port;
    }
    let addr = config.http_addr();

    println!("tagdb HTTP Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Address: {}", addr);
    println!("  Owner:   {}", config.store.owner);
    println!();
    println!("Endpoints:");
    println!("  GET  /health         - Health check");
    println!("  GET  /status         - Store status");
    println!("  POST /query          - Execute a query");
    println!("  GET  /elements/{{key}} - Element snapshot");
    println!("  GET  /tags/{{tag}}     - Keys carrying a tag");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let state = build_state(&config);
    api::run_server(&addr, state, &config.http, shutdown_signal()).await
}

// =============================================================================
// CLIENT COMMAND
// =============================================================================

/// Send queries to a running line server and print the responses.
pub async fn cmd_client(
    config: &Config,
    host: Option<String>,
    port: Option<u16>,
    queries: Vec<String>,
) -> Result<(), TagDbError> {
    let addr = format!(
        "{}:{}",
        host.unwrap_or_else(|| config.server.host.clone()),
        port.unwrap_or(config.server.port)
    );
    let mut client = QueryClient::connect(&addr).await?;
    tracing::debug!("Connected to {}", addr);

    // The server's welcome setting may differ from ours; a greeting left
    // unread would be taken as the first query's response.
    let greeting = if config.server.welcome {
        Some(client.read_greeting().await?)
    } else {
        client.try_read_greeting(GREETING_WAIT).await?
    };
    if let Some(greeting) = greeting {
        println!("{}", greeting);
    }

    if queries.is_empty() {
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            println!("{}", client.query(&line).await?);
        }
    } else {
        for query in &queries {
            println!("{}", client.query(query).await?);
        }
    }

    client.close().await
}

// =============================================================================
// EXEC COMMAND
// =============================================================================

/// Run queries against a fresh in-memory store.
pub fn cmd_exec(config: &Config, file: Option<&Path>) -> Result<(), TagDbError> {
    let mut store = Store::new(config.store.owner.clone());
    let engine = QueryEngine::new(Arc::new(TracingTrace));
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let executed = match file {
        Some(path) => {
            validate_file_size(path, MAX_EXEC_FILE_SIZE)?;
            let file = std::fs::File::open(path).map_err(|e| {
                TagDbError::IoError(format!("Cannot read '{}': {}", path.display(), e))
            })?;
            run_queries(BufReader::new(file), &mut out, &mut store, &engine)?
        }
        None => run_queries(std::io::stdin().lock(), &mut out, &mut store, &engine)?,
    };

    tracing::debug!(executed, "exec finished");
    Ok(())
}

/// Execute one query per line of `reader`, writing each response to `out`.
///
/// Blank lines and lines starting with `#` are skipped. Returns the number
/// of queries executed.
pub fn run_queries<R, W>(
    reader: R,
    out: &mut W,
    store: &mut Store,
    engine: &QueryEngine,
) -> Result<usize, TagDbError>
where
    R: BufRead,
    W: Write,
{
    let mut executed = 0usize;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let query = line.trim();
        if query.is_empty() || query.starts_with('#') {
            continue;
        }
        tracing::debug!(line = index.saturating_add(1), query, "exec");
        writeln!(out, "{}", engine.process(store, query))?;
        executed = executed.saturating_add(1);
    }
    out.flush()?;
    Ok(executed)
}

// =============================================================================
// CONFIG COMMAND
// =============================================================================

/// Print the effective configuration.
pub fn cmd_config(config: &Config) -> Result<(), TagDbError> {
    let output = serde_json::to_string_pretty(config)
        .map_err(|e| TagDbError::SerializationError(e.to_string()))?;
    println!("{}", output);
    Ok(())
}
