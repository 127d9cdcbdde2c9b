//! # Query Engine
//!
//! Entry point from raw query text to a response string.
//!
//! ```text
//! text -> length check -> tokenize -> Query::from_params -> execute -> response
//! ```
//!
//! Parsing and execution are separate steps so that a transport can parse
//! first, then choose between shared and exclusive access to the store
//! based on [`Query::is_read_only`].

use crate::primitives::MAX_QUERY_LENGTH;
use crate::query::Query;
use crate::tokenizer::tokenize;
use crate::trace::{NoopTrace, QueryTrace};
use crate::types::QueryError;
use crate::Store;
use std::fmt;
use std::sync::Arc;

/// Query engine with an attached trace.
#[derive(Clone)]
pub struct QueryEngine {
    trace: Arc<dyn QueryTrace>,
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new(Arc::new(NoopTrace))
    }
}

impl fmt::Debug for QueryEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryEngine").finish_non_exhaustive()
    }
}

impl QueryEngine {
    #[must_use]
    pub fn new(trace: Arc<dyn QueryTrace>) -> Self {
        Self { trace }
    }

    /// Parse query text into a typed query.
    pub fn parse(&self, text: &str) -> Result<Query, QueryError> {
        let result = if text.len() > MAX_QUERY_LENGTH {
            Err(QueryError::QueryTooLong {
                length: text.len(),
                max: MAX_QUERY_LENGTH,
            })
        } else {
            Query::from_params(&tokenize(text, self.trace.as_ref()))
        };

        match &result {
            Ok(query) => self.trace.query_resolved(query),
            Err(error) => self.trace.query_rejected(error),
        }
        result
    }

    /// Execute a parsed query with exclusive access.
    pub fn execute(&self, store: &mut Store, query: &Query) -> Result<String, QueryError> {
        query.execute(store).inspect_err(|error| self.trace.query_rejected(error))
    }

    /// Execute a parsed query with shared access.
    pub fn execute_read(&self, store: &Store, query: &Query) -> Result<String, QueryError> {
        query
            .execute_read(store)
            .inspect_err(|error| self.trace.query_rejected(error))
    }

    /// Parse and execute.
    pub fn run(&self, store: &mut Store, text: &str) -> Result<String, QueryError> {
        let query = self.parse(text)?;
        self.execute(store, &query)
    }

    /// Parse and execute, flattening rejections into their response text.
    pub fn process(&self, store: &mut Store, text: &str) -> String {
        respond(self.run(store, text))
    }
}

/// Collapse an outcome into the text sent back to a client.
#[must_use]
pub fn respond(outcome: Result<String, QueryError>) -> String {
    outcome.unwrap_or_else(|error| error.to_string())
}

/// Run one query against a store without tracing.
pub fn process_query(store: &mut Store, text: &str) -> String {
    QueryEngine::default().process(store, text)
}

// =============================================================================
// TESTS
// =============================================================================
