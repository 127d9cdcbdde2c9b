//! # Telemetry
//!
//! Logging setup and the `tracing`-backed query trace.

use crate::config::LogConfig;
use tagdb_core::{Flag, Query, QueryError, QueryTrace, ScanState};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global subscriber.
///
/// `RUST_LOG` takes precedence over `log.filter`. `verbose` raises the
/// `tagdb` target to `debug` on top of whichever filter is in effect.
pub fn init_tracing(log: &LogConfig, verbose: bool) {
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    if verbose {
        if let Ok(directive) = "tagdb=debug".parse() {
            filter = filter.add_directive(directive);
        }
    }

    match log.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

/// Query trace that forwards to `tracing`.
///
/// Scanner events go to `trace!`, resolution outcomes to `debug!`.
/// Rejections are ordinary responses and never logged above `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTrace;

impl QueryTrace for TracingTrace {
    fn state_entered(&self, state: ScanState) {
        tracing::trace!(?state, "scanner state");
    }

    fn param_captured(&self, flag: Flag, value: &str) {
        tracing::trace!(flag = flag.name(), value, "parameter captured");
    }

    fn query_resolved(&self, query: &Query) {
        tracing::debug!(kind = query.kind(), "query resolved");
    }

    fn query_rejected(&self, error: &QueryError) {
        tracing::debug!(%error, "query rejected");
    }
}
