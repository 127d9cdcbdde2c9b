//! # Element
//!
//! A single stored record: an opaque payload, a set of tags and the time of
//! the last modification.
//!
//! Every mutation of the payload or the tag set restamps the element.
//! Tags are kept in a `BTreeSet` so rendering is deterministic.

use crate::Timestamp;
use crate::primitives::{INVALID_KEY_PAYLOAD, NOT_AVAILABLE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    payload: String,
    tags: BTreeSet<String>,
    last_modified: Timestamp,
}

impl Element {
    /// Create an untagged element.
    #[must_use]
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            tags: BTreeSet::new(),
            last_modified: Timestamp::now(),
        }
    }

    /// Create an element carrying the given tags. Duplicates collapse.
    #[must_use]
    pub fn with_tags<I, S>(payload: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            payload: payload.into(),
            tags: tags.into_iter().map(Into::into).collect(),
            last_modified: Timestamp::now(),
        }
    }

    /// The element handed out for a key that does not exist.
    #[must_use]
    pub fn invalid_key() -> Self {
        Self::new(INVALID_KEY_PAYLOAD)
    }

    /// The stored payload.
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Replace the payload and return the new value.
    pub fn set_payload(&mut self, payload: impl Into<String>) -> &str {
        self.payload = payload.into();
        self.touch();
        &self.payload
    }

    /// Add a tag. Returns `false` (and changes nothing) if already present.
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        if !self.tags.insert(tag.into()) {
            return false;
        }
        self.touch();
        true
    }

    /// Add several tags, restamping once if anything changed.
    ///
    /// Returns how many tags were newly added; repeats inside `tags` and tags
    /// already present are not counted.
    pub fn add_tags<I, S>(&mut self, tags: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut inserted = 0usize;
        for tag in tags {
            if self.tags.insert(tag.into()) {
                inserted = inserted.saturating_add(1);
            }
        }
        if inserted > 0 {
            self.touch();
        }
        inserted
    }

    /// Remove a tag. Returns `false` if it was not present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        if !self.tags.remove(tag) {
            return false;
        }
        self.touch();
        true
    }

    /// Whether the element carries `tag`.
    #[must_use]
    pub fn tag_exists(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Number of tags.
    #[must_use]
    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    /// Tags in sorted order.
    #[must_use]
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Time of the last modification.
    #[must_use]
    pub fn last_modified(&self) -> Timestamp {
        self.last_modified
    }

    /// Human-readable dump used by `SHOW` queries.
    ///
    /// ```text
    ///  Data      : <payload>
    ///  Timestamp : <yyyy/MM/dd hh:mm:ss>
    ///  Tags      : "<tag1>", "<tag2>"
    /// ```
    #[must_use]
    pub fn render(&self) -> String {
        let tags = if self.tags.is_empty() {
            format!("\"{}\"", NOT_AVAILABLE)
        } else {
            self.tags
                .iter()
                .map(|tag| format!("\"{}\"", tag))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut out = String::new();
        out.push_str(&format!(" Data      : {}\n", self.payload));
        out.push_str(&format!(" Timestamp : {}\n", self.last_modified));
        out.push_str(&format!(" Tags      : {}\n", tags));
        out
    }

    fn touch(&mut self) {
        self.last_modified = self.last_modified.advance();
    }
}

// =============================================================================
// TESTS
// =============================================================================
