//! # Core Type Definitions
//!
//! Shared types for the tagdb CORE:
//! - Element timestamps (`Timestamp`)
//! - Query flags and the scanner's output record (`Flag`, `QueryParams`)
//! - Error types (`QueryError`, `TagDbError`)
//!
//! ## Determinism Guarantees
//!
//! Timestamps are totally ordered and never move backwards on a single
//! element. Everything that is rendered iterates in sorted order.

use crate::primitives::TIMESTAMP_FORMAT;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// TIMESTAMP
// =============================================================================

/// Last-modified time of an element, in local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Current local time.
    #[must_use]
    pub fn now() -> Self {
        Self(Local::now().naive_local())
    }

    /// Wrap an existing date-time.
    #[must_use]
    pub const fn from_naive(value: NaiveDateTime) -> Self {
        Self(value)
    }

    /// The underlying date-time.
    #[must_use]
    pub const fn as_naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Restamp to the current time without ever moving backwards.
    ///
    /// Wall clocks can step back (NTP, DST); the element's timestamp must not.
    #[must_use]
    pub fn advance(self) -> Self {
        self.max(Self::now())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

// =============================================================================
// QUERY FLAGS
// =============================================================================

/// A single-letter flag of the query language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Flag {
    /// `-t`: query type (INSERT, DELETE, UPDATE, SHOW).
    Type,
    /// `-k`: element key.
    Key,
    /// `-v`: element payload.
    Value,
    /// `-o`: sub-operation (AddTag, RemoveTag, ByTag).
    Operation,
    /// `-p`: operation parameter (a tag).
    Parameter,
    /// `-u`: issuing user. Parsed and traced, never used for dispatch.
    User,
}

impl Flag {
    /// Every flag, in marker-letter order of the grammar.
    pub const ALL: [Flag; 6] = [
        Flag::Type,
        Flag::Key,
        Flag::Value,
        Flag::Operation,
        Flag::Parameter,
        Flag::User,
    ];

    /// The marker letter that follows `-`.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Flag::Type => 't',
            Flag::Key => 'k',
            Flag::Value => 'v',
            Flag::Operation => 'o',
            Flag::Parameter => 'p',
            Flag::User => 'u',
        }
    }

    /// Resolve a marker letter. Case-sensitive.
    #[must_use]
    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter {
            't' => Some(Flag::Type),
            'k' => Some(Flag::Key),
            'v' => Some(Flag::Value),
            'o' => Some(Flag::Operation),
            'p' => Some(Flag::Parameter),
            'u' => Some(Flag::User),
            _ => None,
        }
    }

    /// Human-readable name, used in traces.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Flag::Type => "type",
            Flag::Key => "key",
            Flag::Value => "value",
            Flag::Operation => "operation",
            Flag::Parameter => "parameter",
            Flag::User => "user",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// QUERY PARAMETERS
// =============================================================================

/// Parameters extracted from a query string by the tokenizer.
///
/// A `None` field means the flag was not supplied. A flag followed only by
/// whitespace is supplied with an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub query_type: Option<String>,
    pub key: Option<String>,
    pub value: Option<String>,
    pub operation: Option<String>,
    pub parameter: Option<String>,
    pub user: Option<String>,
}

impl QueryParams {
    /// Create an empty parameter record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under a flag. A repeated flag overwrites the earlier value.
    pub fn set(&mut self, flag: Flag, value: impl Into<String>) {
        *self.slot_mut(flag) = Some(value.into());
    }

    /// Builder form of [`QueryParams::set`].
    #[must_use]
    pub fn with(mut self, flag: Flag, value: impl Into<String>) -> Self {
        self.set(flag, value);
        self
    }

    /// Value supplied for a flag.
    #[must_use]
    pub fn get(&self, flag: Flag) -> Option<&str> {
        let slot = match flag {
            Flag::Type => &self.query_type,
            Flag::Key => &self.key,
            Flag::Value => &self.value,
            Flag::Operation => &self.operation,
            Flag::Parameter => &self.parameter,
            Flag::User => &self.user,
        };
        slot.as_deref()
    }

    /// Whether a flag was supplied.
    #[must_use]
    pub fn has(&self, flag: Flag) -> bool {
        self.get(flag).is_some()
    }

    fn slot_mut(&mut self, flag: Flag) -> &mut Option<String> {
        match flag {
            Flag::Type => &mut self.query_type,
            Flag::Key => &mut self.key,
            Flag::Value => &mut self.value,
            Flag::Operation => &mut self.operation,
            Flag::Parameter => &mut self.parameter,
            Flag::User => &mut self.user,
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Reasons a query is rejected or cannot be carried out.
///
/// The `Display` text of each variant is the response string returned to
/// the client. None of these are faults: they are ordinary outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// No `-t` flag.
    #[error("Invalid Query Syntax. Query Type is Undefined.")]
    MissingType,

    /// `-t` carried something other than INSERT, DELETE, UPDATE or SHOW.
    #[error("Invalid Query Syntax. Given Query Type is Not Supported.")]
    UnsupportedType(String),

    #[error("Invalid Query Syntax. Insert Query Requires both Key and Value Arguments.")]
    InsertMissingArguments,

    #[error("Invalid Query Syntax. Insert Query Should not contain Operation or Parameter Arguments.")]
    InsertForbiddenArguments,

    #[error("Invalid Query Syntax. Delete Query Requires Key Argument.")]
    DeleteMissingKey,

    #[error(
        "Invalid Query Syntax. Delete Query Should not contain Value or Operation or Parameter Arguments."
    )]
    DeleteForbiddenArguments,

    /// The key/value/operation/parameter combination matches no sub-query of
    /// the given query type.
    #[error("Invalid Query Syntax. Unsupported Argument Combination for {0} Query.")]
    InvalidSubQuery(&'static str),

    /// `-o` under UPDATE was neither AddTag nor RemoveTag.
    #[error("Invalid Query Syntax. Invalid Operation Argument.")]
    InvalidUpdateOperation(String),

    /// `-o` under SHOW was not ByTag.
    #[error("Invalid Query Syntax. Operation Not Defined for Show Query.")]
    InvalidShowOperation(String),

    #[error("An object with given key already exists in the Database.")]
    KeyExists,

    #[error("No Object with given key exists in the Database.")]
    KeyNotFound,

    #[error("Query Rejected. Query length {length} exceeds maximum {max} bytes.")]
    QueryTooLong { length: usize, max: usize },

    /// A mutating query was handed to a read-only execution path.
    #[error("Query Rejected. Query modifies the Database and requires write access.")]
    RequiresWrite,
}

/// Process-level errors: configuration, I/O and transport failures.
///
/// - No silent failures
/// - The CORE itself never returns these from store or query operations
#[derive(Debug, Error)]
pub enum TagDbError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// Configuration could not be read or is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The peer violated the line protocol.
    #[error("Protocol error: {0}")]
    ProtocolError(String),
}

impl From<std::io::Error> for TagDbError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

// =============================================================================
// TESTS
// =============================================================================
