//! Integration tests for the TCP line server and client.
//!
//! Every test binds a server to an ephemeral loopback port.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use std::time::Duration;
use tagdb::client::QueryClient;
use tagdb::config::ServerConfig;
use tagdb::server::{LineServer, MSG_SHUTDOWN_REFUSED, MSG_SHUTTING_DOWN, WELCOME, read_frame};
use tagdb::state::AppState;
use tagdb_core::{QueryEngine, Store};
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

struct Running {
    addr: String,
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl Running {
    /// Wait for the server to exit on its own.
    async fn join(self) {
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .unwrap()
            .unwrap();
    }

    async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .unwrap()
            .unwrap();
    }
}

fn test_settings() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..ServerConfig::default()
    }
}

async fn start(settings: ServerConfig) -> Running {
    let state = AppState::new(Store::new("admin"), QueryEngine::default());
    let server = LineServer::bind("127.0.0.1:0", state, settings)
        .await
        .unwrap();
    let addr = server.local_addr().unwrap().to_string();

    let (stop, stopped) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        server
            .run(async {
                let _ = stopped.await;
            })
            .await
            .unwrap();
    });

    Running {
        addr,
        stop: Some(stop),
        handle,
    }
}

// =============================================================================
// QUERIES
// =============================================================================

#[tokio::test]
async fn test_insert_then_show() {
    let running = start(test_settings()).await;
    let mut client = QueryClient::connect(&running.addr).await.unwrap();

    let inserted = client
        .query("-t INSERT -k key6 -v Wyatt")
        .await
        .unwrap();
    assert_eq!(inserted, "Object Successfully inserted into Database.");

    let shown = client.query("-t SHOW -k key6").await.unwrap();
    assert!(shown.starts_with(" Key : key6\n -----\n Data      : Wyatt\n"));
    assert!(shown.ends_with(" Tags      : \"N/A\""));

    client.close().await.unwrap();
    running.stop().await;
}

#[tokio::test]
async fn test_rejections_are_answered() {
    let running = start(test_settings()).await;
    let mut client = QueryClient::connect(&running.addr).await.unwrap();

    let response = client.query("-t DELETE -k nope").await.unwrap();
    assert_eq!(response, "No Object with given key exists in the Database.");

    let response = client.query("-k key0").await.unwrap();
    assert!(response.starts_with("Invalid Query Syntax."));

    client.close().await.unwrap();
    running.stop().await;
}

#[tokio::test]
async fn test_store_is_shared_between_connections() {
    let running = start(test_settings()).await;

    let mut writer = QueryClient::connect(&running.addr).await.unwrap();
    writer.query("-t INSERT -k shared -v value").await.unwrap();
    writer
        .query("-t UPDATE -k shared -o AddTag -p Common")
        .await
        .unwrap();
    writer.close().await.unwrap();

    let mut reader = QueryClient::connect(&running.addr).await.unwrap();
    let listing = reader.query("-t SHOW -o ByTag -p Common").await.unwrap();
    assert!(listing.contains(" Key : shared\n"));
    reader.close().await.unwrap();

    running.stop().await;
}

#[tokio::test]
async fn test_client_rejects_multi_line_query() {
    let running = start(test_settings()).await;
    let mut client = QueryClient::connect(&running.addr).await.unwrap();

    assert!(client.query("-t SHOW\n-t SHOW").await.is_err());
    assert!(client.query("   ").await.is_err());

    client.close().await.unwrap();
    running.stop().await;
}

// =============================================================================
// RAW PROTOCOL
// =============================================================================

#[tokio::test]
async fn test_blank_lines_get_no_answer() {
    let running = start(test_settings()).await;
    let socket = TcpStream::connect(&running.addr).await.unwrap();
    let (read_half, mut writer) = socket.into_split();
    let mut reader = BufReader::new(read_half);

    writer
        .write_all(b"\n   \r\n-t INSERT -k a -v b\n")
        .await
        .unwrap();
    let response = read_frame(&mut reader).await.unwrap();
    assert_eq!(response, "Object Successfully inserted into Database.");

    drop(writer);
    running.stop().await;
}

#[tokio::test]
async fn test_over_long_line_closes_connection() {
    let settings = ServerConfig {
        max_query_bytes: 32,
        ..test_settings()
    };
    let running = start(settings).await;
    let socket = TcpStream::connect(&running.addr).await.unwrap();
    let (read_half, mut writer) = socket.into_split();
    let mut reader = BufReader::new(read_half);

    // One byte over the limit, so the whole line is consumed.
    let long = format!("{}\n", "x".repeat(33));
    writer.write_all(long.as_bytes()).await.unwrap();

    let response = read_frame(&mut reader).await.unwrap();
    assert_eq!(
        response,
        "Query Rejected. Query length 33 exceeds maximum 32 bytes."
    );

    // The server hung up after the rejection.
    assert!(read_frame(&mut reader).await.is_err());
    running.stop().await;
}

#[tokio::test]
async fn test_welcome_greeting() {
    let settings = ServerConfig {
        welcome: true,
        ..test_settings()
    };
    let running = start(settings).await;
    let mut client = QueryClient::connect(&running.addr).await.unwrap();

    assert_eq!(client.read_greeting().await.unwrap(), WELCOME);

    client.close().await.unwrap();
    running.stop().await;
}

#[tokio::test]
async fn test_unannounced_greeting_is_consumed() {
    let settings = ServerConfig {
        welcome: true,
        ..test_settings()
    };
    let running = start(settings).await;
    let mut client = QueryClient::connect(&running.addr).await.unwrap();

    let greeting = client
        .try_read_greeting(Duration::from_secs(2))
        .await
        .unwrap();
    assert_eq!(greeting.as_deref(), Some(WELCOME));

    // The first response is not shifted by the greeting.
    let response = client.query("-t DELETE -k nope").await.unwrap();
    assert_eq!(response, "No Object with given key exists in the Database.");

    client.close().await.unwrap();
    running.stop().await;
}

#[tokio::test]
async fn test_silent_server_gives_no_greeting() {
    let running = start(test_settings()).await;
    let mut client = QueryClient::connect(&running.addr).await.unwrap();

    let greeting = client
        .try_read_greeting(Duration::from_millis(100))
        .await
        .unwrap();
    assert!(greeting.is_none());

    let response = client.query("-t INSERT -k a -v b").await.unwrap();
    assert_eq!(response, "Object Successfully inserted into Database.");

    client.close().await.unwrap();
    running.stop().await;
}

// =============================================================================
// SHUTDOWN
// =============================================================================

#[tokio::test]
async fn test_remote_shutdown_refused_by_default() {
    let running = start(test_settings()).await;
    let mut client = QueryClient::connect(&running.addr).await.unwrap();

    assert_eq!(
        client.shutdown_server().await.unwrap(),
        MSG_SHUTDOWN_REFUSED
    );
    // The connection stays usable.
    assert!(client.query("-t SHOW").await.is_ok());

    client.close().await.unwrap();
    running.stop().await;
}

#[tokio::test]
async fn test_remote_shutdown_stops_server() {
    let settings = ServerConfig {
        allow_remote_shutdown: true,
        ..test_settings()
    };
    let running = start(settings).await;
    let mut client = QueryClient::connect(&running.addr).await.unwrap();

    assert_eq!(client.shutdown_server().await.unwrap(), MSG_SHUTTING_DOWN);

    running.join().await;
}

#[tokio::test]
async fn test_idle_connections_end_on_shutdown() {
    let running = start(test_settings()).await;
    let socket = TcpStream::connect(&running.addr).await.unwrap();
    let (read_half, _writer) = socket.into_split();
    let mut reader = BufReader::new(read_half);

    running.stop().await;

    let closed = tokio::time::timeout(Duration::from_secs(5), read_frame(&mut reader))
        .await
        .unwrap();
    assert!(closed.is_err());
}
