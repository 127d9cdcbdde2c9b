//! # tagdb
//!
//! Transports, CLI and configuration around `tagdb-core`.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  apps/tagdb (THE BINARY)                 │
//! │                                                          │
//! │  ┌────────────┐   ┌─────────────┐   ┌──────────────┐     │
//! │  │    CLI     │   │ Line server │   │   HTTP API   │     │
//! │  │   (clap)   │   │   (tokio)   │   │    (axum)    │     │
//! │  └─────┬──────┘   └──────┬──────┘   └──────┬───────┘     │
//! │        └─────────────────┼─────────────────┘             │
//! │                          ▼                               │
//! │              AppState: RwLock<Store>                     │
//! │                          ▼                               │
//! │                   ┌─────────────┐                        │
//! │                   │ tagdb-core  │                        │
//! │                   │ (THE LOGIC) │                        │
//! │                   └─────────────┘                        │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod server;
pub mod state;
pub mod telemetry;
