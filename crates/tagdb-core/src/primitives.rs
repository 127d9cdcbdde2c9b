//! # Primitives
//!
//! Fixed constants of the tagdb CORE: sentinel strings, rendering markers
//! and input limits. Compiled in, immutable at runtime.

/// Owner label given to a store created without one.
pub const DEFAULT_OWNER: &str = "anonymous";

/// Payload carried by the element returned for a key that does not exist.
///
/// A stored element whose payload happens to equal this string is
/// indistinguishable from a miss. Use `Store::exists` or `Store::get`
/// when the difference matters.
pub const INVALID_KEY_PAYLOAD: &str = "> invalid key";

/// Rendering of a single key that does not exist.
pub const INVALID_KEY_RENDER: &str = "Invalid Key";

/// Placeholder for an empty tag list and for a tag that was never indexed.
pub const NOT_AVAILABLE: &str = "N/A";

/// `chrono` format string used when rendering timestamps (`yyyy/MM/dd hh:mm:ss`).
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

// =============================================================================
// QUERY LANGUAGE
// =============================================================================

/// Character that introduces a flag marker (`-t`, `-k`, ...).
pub const FLAG_PREFIX: char = '-';

/// Operation value that adds a tag under `UPDATE`.
pub const OP_ADD_TAG: &str = "AddTag";

/// Operation value that removes a tag under `UPDATE`.
pub const OP_REMOVE_TAG: &str = "RemoveTag";

/// Operation value that filters by tag under `SHOW`.
pub const OP_BY_TAG: &str = "ByTag";

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length of a single query string in bytes.
///
/// Longer queries are rejected before tokenizing.
pub const MAX_QUERY_LENGTH: usize = 18_000;
