//! # TCP Line Server
//!
//! Serves the query language over plain TCP.
//!
//! ## Protocol
//!
//! - The client sends one query per line (`\n` or `\r\n`).
//! - The server answers each query with the response text followed by a
//!   line holding a single `.`. Response lines that begin with `.` are sent
//!   with an extra leading `.`, which the client strips.
//! - Blank lines get no answer.
//! - `termClient();` closes the connection.
//! - `termServer();` stops the server when remote shutdown is enabled.
//! - A line longer than `max_query_bytes` is answered with a rejection and
//!   the connection is closed.

use crate::config::ServerConfig;
use crate::state::AppState;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tagdb_core::{QueryError, TagDbError, respond};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Closes the sending connection.
pub const TERM_CLIENT: &str = "termClient();";

/// Stops the server, if remote shutdown is enabled.
pub const TERM_SERVER: &str = "termServer();";

/// Line that ends every framed response.
pub const TERMINATOR: &str = ".";

/// Greeting sent on connect when enabled.
pub const WELCOME: &str = " Welcome !";

pub const MSG_SHUTTING_DOWN: &str = "Server shutting down.";
pub const MSG_SHUTDOWN_REFUSED: &str = "Query Rejected. Remote shutdown is disabled.";

// =============================================================================
// SERVER
// =============================================================================

/// A bound TCP line server.
pub struct LineServer {
    listener: TcpListener,
    state: AppState,
    settings: Arc<ServerConfig>,
}

impl LineServer {
    /// Bind to `addr`. Port `0` picks a free port.
    pub async fn bind(
        addr: &str,
        state: AppState,
        settings: ServerConfig,
    ) -> Result<Self, TagDbError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| TagDbError::IoError(format!("Bind failed: {}", e)))?;
        Ok(Self {
            listener,
            state,
            settings: Arc::new(settings),
        })
    }

    /// The address actually bound.
    pub fn local_addr(&self) -> Result<SocketAddr, TagDbError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until `shutdown` completes or a client sends
    /// `termServer();` with remote shutdown enabled.
    pub async fn run<F>(self, shutdown: F) -> Result<(), TagDbError>
    where
        F: Future<Output = ()>,
    {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let stop_tx = Arc::new(stop_tx);
        tokio::pin!(shutdown);

        if let Ok(addr) = self.listener.local_addr() {
            info!("tagdb line server listening on {}", addr);
        }

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (socket, peer_addr) = match accepted {
                        Ok(pair) => pair,
                        Err(e) => {
                            warn!("Accept failed: {}", e);
                            continue;
                        }
                    };
                    let connection = Connection {
                        state: self.state.clone(),
                        settings: Arc::clone(&self.settings),
                        stop: Arc::clone(&stop_tx),
                    };
                    let stopped = stop_tx.subscribe();

                    tokio::spawn(async move {
                        debug!("New connection from {}", peer_addr);
                        if let Err(e) = connection.serve(socket, stopped).await {
                            warn!("Connection error from {}: {}", peer_addr, e);
                        }
                        debug!("Connection closed: {}", peer_addr);
                    });
                }
                _ = stop_rx.changed() => {
                    info!("Remote shutdown requested");
                    break;
                }
                () = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        // Wake connection tasks still waiting on their clients.
        stop_tx.send_replace(true);
        Ok(())
    }
}

/// Resolves on Ctrl+C. Never resolves if the handler cannot be installed.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

// =============================================================================
// CONNECTION
// =============================================================================

struct Connection {
    state: AppState,
    settings: Arc<ServerConfig>,
    stop: Arc<watch::Sender<bool>>,
}

impl Connection {
    async fn serve(
        self,
        socket: TcpStream,
        mut stopped: watch::Receiver<bool>,
    ) -> Result<(), TagDbError> {
        socket.set_nodelay(true)?;
        let (read_half, mut writer) = socket.into_split();
        let mut reader = BufReader::new(read_half);

        if self.settings.welcome {
            write_frame(&mut writer, WELCOME).await?;
        }

        loop {
            let line = tokio::select! {
                line = read_bounded_line(&mut reader, self.settings.max_query_bytes) => line?,
                _ = stopped.changed() => return Ok(()),
            };

            let text = match line {
                Line::Eof => return Ok(()),
                Line::TooLong(length) => {
                    let error = QueryError::QueryTooLong {
                        length,
                        max: self.settings.max_query_bytes,
                    };
                    warn!("Dropping client: {}", error);
                    write_frame(&mut writer, &error.to_string()).await?;
                    return Ok(());
                }
                Line::Text(text) => text,
            };

            let query = text.trim();
            if query.is_empty() {
                continue;
            }
            if query == TERM_CLIENT {
                return Ok(());
            }
            if query == TERM_SERVER {
                if self.settings.allow_remote_shutdown {
                    write_frame(&mut writer, MSG_SHUTTING_DOWN).await?;
                    self.stop.send_replace(true);
                    return Ok(());
                }
                write_frame(&mut writer, MSG_SHUTDOWN_REFUSED).await?;
                continue;
            }

            let response = respond(self.state.execute(query).await);
            write_frame(&mut writer, &response).await?;
        }
    }
}

// =============================================================================
// FRAMING
// =============================================================================

/// Outcome of reading one line.
#[derive(Debug, PartialEq, Eq)]
pub enum Line {
    /// A line without its terminator.
    Text(String),
    /// The line exceeded the limit; carries the bytes read so far.
    TooLong(usize),
    /// The peer closed the connection.
    Eof,
}

/// Read one line of at most `limit` bytes, excluding the line ending.
pub async fn read_bounded_line<R>(reader: &mut R, limit: usize) -> Result<Line, TagDbError>
where
    R: AsyncBufRead + Unpin,
{
    let cap = u64::try_from(limit.saturating_add(2)).unwrap_or(u64::MAX);
    let mut buf = Vec::new();
    let read = reader.take(cap).read_until(b'\n', &mut buf).await?;
    if read == 0 {
        return Ok(Line::Eof);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    if buf.len() > limit {
        return Ok(Line::TooLong(buf.len()));
    }
    Ok(Line::Text(String::from_utf8_lossy(&buf).into_owned()))
}

/// Write a response followed by the terminator line.
pub async fn write_frame<W>(writer: &mut W, body: &str) -> Result<(), TagDbError>
where
    W: AsyncWrite + Unpin,
{
    let mut out = String::with_capacity(body.len().saturating_add(4));
    for line in body.lines() {
        if line.starts_with(TERMINATOR) {
            out.push_str(TERMINATOR);
        }
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(TERMINATOR);
    out.push('\n');

    writer.write_all(out.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Read a framed response written by [`write_frame`].
///
/// Lines are rejoined with `\n`; a trailing newline in the written body is
/// not preserved.
pub async fn read_frame<R>(reader: &mut R) -> Result<String, TagDbError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = Vec::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            return Err(TagDbError::ProtocolError(
                "connection closed before end of response".to_string(),
            ));
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line == TERMINATOR {
            break;
        }
        lines.push(line.strip_prefix(TERMINATOR).unwrap_or(line).to_string());
    }
    Ok(lines.join("\n"))
}
