//! # tagdb-core
//!
//! The tag-indexed key-value store and its query language - THE LOGIC.
//!
//! ```text
//! query text -> Tokenizer -> QueryParams -> Query -> Store -> response text
//! ```
//!
//! ## Architectural Constraints
//!
//! The CORE:
//! - Owns every stored element; readers always receive copies
//! - Keeps the tag index consistent with element tag sets after every mutation
//! - Answers every query with a string; nothing here is fatal
//! - Has NO async, NO network, NO logging dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod element;
pub mod engine;
pub mod primitives;
pub mod query;
pub mod store;
pub mod tokenizer;
pub mod trace;
pub mod types;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use element::Element;
pub use engine::{QueryEngine, process_query, respond};
pub use query::{Query, QueryType};
pub use store::Store;
pub use tokenizer::{ScanState, tokenize};
pub use trace::{NoopTrace, QueryTrace};
pub use types::{Flag, QueryError, QueryParams, TagDbError, Timestamp};
