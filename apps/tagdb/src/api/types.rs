//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use serde::{Deserialize, Serialize};
use tagdb_core::Element;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STATUS RESPONSE
// =============================================================================

/// Store status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub owner: String,
    pub element_count: usize,
    /// Tags that have ever been indexed, including currently unused ones.
    pub tag_count: usize,
}

// =============================================================================
// QUERY REQUEST/RESPONSE
// =============================================================================

/// A raw query string, exactly as it would be sent over the line protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// Query response. `success` is false when the query was rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub success: bool,
    pub response: String,
}

impl QueryResponse {
    #[must_use]
    pub fn success(response: String) -> Self {
        Self {
            success: true,
            response,
        }
    }

    #[must_use]
    pub fn rejected(response: String) -> Self {
        Self {
            success: false,
            response,
        }
    }
}

// =============================================================================
// ELEMENT RESPONSE
// =============================================================================

/// Snapshot of a single element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementResponse {
    pub found: bool,
    pub key: String,
    pub payload: Option<String>,
    pub tags: Vec<String>,
    pub last_modified: Option<String>,
}

impl ElementResponse {
    #[must_use]
    pub fn found(key: &str, element: &Element) -> Self {
        Self {
            found: true,
            key: key.to_string(),
            payload: Some(element.payload().to_string()),
            tags: element.tags().iter().cloned().collect(),
            last_modified: Some(element.last_modified().to_string()),
        }
    }

    #[must_use]
    pub fn not_found(key: &str) -> Self {
        Self {
            found: false,
            key: key.to_string(),
            payload: None,
            tags: Vec::new(),
            last_modified: None,
        }
    }
}

// =============================================================================
// TAG RESPONSE
// =============================================================================

/// Keys carrying a tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagResponse {
    pub tag: String,
    /// Whether the tag was ever indexed.
    pub indexed: bool,
    pub keys: Vec<String>,
}
