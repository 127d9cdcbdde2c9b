//! # Query Trace
//!
//! Diagnostics seam for the tokenizer and the query engine.
//!
//! The CORE carries no logging dependency. Callers that want to observe
//! query processing implement [`QueryTrace`] and hand it to the
//! [`QueryEngine`](crate::QueryEngine). Trace hooks are called at fixed
//! points and their return values never influence control flow.

use crate::query::Query;
use crate::tokenizer::ScanState;
use crate::types::{Flag, QueryError};

/// Observer of query processing. Every method defaults to a no-op.
///
/// Implementations must be `Send + Sync`: one engine is shared by every
/// connection of a transport.
pub trait QueryTrace: Send + Sync {
    /// The scanner switched state.
    fn state_entered(&self, _state: ScanState) {}

    /// The scanner committed a value for a flag.
    fn param_captured(&self, _flag: Flag, _value: &str) {}

    /// A query string resolved to a typed query.
    fn query_resolved(&self, _query: &Query) {}

    /// A query string was rejected, or failed against the store.
    fn query_rejected(&self, _error: &QueryError) {}
}

/// Trace that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTrace;

impl QueryTrace for NoopTrace {}
