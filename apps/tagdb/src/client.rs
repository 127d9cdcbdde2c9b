//! # Line Client
//!
//! Client side of the TCP line protocol served by [`crate::server`].

use crate::server::{TERM_CLIENT, TERM_SERVER, read_frame};
use tagdb_core::TagDbError;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

/// A connection to a tagdb line server.
pub struct QueryClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl QueryClient {
    /// Connect to `addr` (`host:port`).
    pub async fn connect(addr: &str) -> Result<Self, TagDbError> {
        let socket = TcpStream::connect(addr)
            .await
            .map_err(|e| TagDbError::IoError(format!("Cannot connect to {}: {}", addr, e)))?;
        socket.set_nodelay(true)?;
        let (read_half, writer) = socket.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer,
        })
    }

    /// Read the greeting a server sends when its welcome is enabled.
    pub async fn read_greeting(&mut self) -> Result<String, TagDbError> {
        read_frame(&mut self.reader).await
    }

    /// Read a greeting if the server sends one within `wait`.
    ///
    /// Returns `None` when nothing arrives in time; no bytes are consumed in
    /// that case, so the connection stays in step for the first query.
    pub async fn try_read_greeting(&mut self, wait: Duration) -> Result<Option<String>, TagDbError> {
        let pending = match tokio::time::timeout(wait, self.reader.fill_buf()).await {
            Ok(buffered) => !buffered?.is_empty(),
            Err(_) => false,
        };
        if !pending {
            return Ok(None);
        }
        read_frame(&mut self.reader).await.map(Some)
    }

    /// Send one query and wait for its response.
    pub async fn query(&mut self, text: &str) -> Result<String, TagDbError> {
        let text = text.trim();
        if text.contains('\n') || text.contains('\r') {
            return Err(TagDbError::ProtocolError(
                "query must be a single line".to_string(),
            ));
        }
        if text.is_empty() {
            return Err(TagDbError::ProtocolError("query is empty".to_string()));
        }

        self.send_line(text).await?;
        read_frame(&mut self.reader).await
    }

    /// Ask the server to stop. Only honoured when remote shutdown is enabled.
    pub async fn shutdown_server(&mut self) -> Result<String, TagDbError> {
        self.send_line(TERM_SERVER).await?;
        read_frame(&mut self.reader).await
    }

    /// Say goodbye and close the connection.
    pub async fn close(mut self) -> Result<(), TagDbError> {
        self.send_line(TERM_CLIENT).await?;
        self.writer.shutdown().await?;
        Ok(())
    }

    async fn send_line(&mut self, line: &str) -> Result<(), TagDbError> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }
}
