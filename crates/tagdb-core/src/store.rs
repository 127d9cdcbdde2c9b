//! # Store
//!
//! The tag-indexed key-value store.
//!
//! `Store` owns every [`Element`] by value in a `BTreeMap` and maintains an
//! inverted index from tag to the set of keys carrying it.
//!
//! ## Index invariant
//!
//! For every key `K` holding element `E` and every tag `T` in `E`, the index
//! entry for `T` contains `K`; no index entry contains a key that does not
//! currently carry that tag. Every mutating method restores this before it
//! returns.
//!
//! Index entries are created the first time a tag is seen and are kept even
//! when they become empty, so "never indexed" stays distinguishable from
//! "indexed, currently unused" (see [`Store::render_by_tag`]).
//!
//! Mutations report `false` for a missing or already present key. Those are
//! ordinary outcomes, not errors.

use crate::Element;
use crate::primitives::{DEFAULT_OWNER, INVALID_KEY_RENDER, NOT_AVAILABLE};
use std::collections::{BTreeMap, BTreeSet};

/// In-memory store of tagged elements.
#[derive(Debug, Clone)]
pub struct Store {
    /// Display label, no invariant.
    owner: String,

    /// Element storage: key -> element.
    elements: BTreeMap<String, Element>,

    /// Inverted index: tag -> keys whose element carries the tag.
    tag_index: BTreeMap<String, BTreeSet<String>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(DEFAULT_OWNER)
    }
}

impl Store {
    /// Create an empty store.
    #[must_use]
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            elements: BTreeMap::new(),
            tag_index: BTreeMap::new(),
        }
    }

    /// The owner label.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Replace the owner label and return the new value.
    pub fn set_owner(&mut self, owner: impl Into<String>) -> &str {
        self.owner = owner.into();
        &self.owner
    }

    /// Number of stored elements.
    #[must_use]
    pub fn size(&self) -> usize {
        self.elements.len()
    }

    /// Whether the store holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Whether `key` holds an element.
    #[must_use]
    pub fn exists(&self, key: &str) -> bool {
        self.elements.contains_key(key)
    }

    /// All keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.elements.keys().map(String::as_str)
    }

    /// Every tag that has ever been indexed, in sorted order.
    pub fn indexed_tags(&self) -> impl Iterator<Item = &str> + '_ {
        self.tag_index.keys().map(String::as_str)
    }

    // =========================================================================
    // ELEMENT LIFECYCLE
    // =========================================================================

    /// Insert a new element. Returns `false` if `key` is already taken.
    pub fn insert(&mut self, key: impl Into<String>, element: Element) -> bool {
        let key = key.into();
        if self.elements.contains_key(&key) {
            return false;
        }
        self.link_tags(&key, &element);
        self.elements.insert(key, element);
        true
    }

    /// Replace the element at `key`. Returns `false` if `key` is absent.
    ///
    /// The old element's index links are purged before the new element's
    /// are established, since the two tag sets may differ.
    pub fn update(&mut self, key: &str, element: Element) -> bool {
        let Some(previous) = self.elements.remove(key) else {
            return false;
        };
        self.unlink_tags(key, &previous);
        self.link_tags(key, &element);
        self.elements.insert(key.to_string(), element);
        true
    }

    /// Remove the element at `key`. Returns `false` if `key` is absent.
    pub fn remove(&mut self, key: &str) -> bool {
        let Some(previous) = self.elements.remove(key) else {
            return false;
        };
        self.unlink_tags(key, &previous);
        true
    }

    /// Replace only the payload at `key`. Tags and index are untouched.
    pub fn update_payload(&mut self, key: &str, payload: impl Into<String>) -> bool {
        match self.elements.get_mut(key) {
            Some(element) => {
                element.set_payload(payload);
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // TAG OPERATIONS
    // =========================================================================

    /// Tag the element at `key`.
    ///
    /// Returns `false` only if `key` is absent. Tagging with a tag the
    /// element already carries succeeds without changing anything.
    pub fn add_tag(&mut self, key: &str, tag: &str) -> bool {
        let Some(element) = self.elements.get_mut(key) else {
            return false;
        };
        if element.add_tag(tag) {
            self.tag_index
                .entry(tag.to_string())
                .or_default()
                .insert(key.to_string());
        }
        true
    }

    /// Untag the element at `key`.
    ///
    /// Returns `false` only if `key` is absent. Removing a tag the element
    /// does not carry succeeds without changing anything.
    pub fn remove_tag(&mut self, key: &str, tag: &str) -> bool {
        let Some(element) = self.elements.get_mut(key) else {
            return false;
        };
        if element.remove_tag(tag) {
            if let Some(keys) = self.tag_index.get_mut(tag) {
                keys.remove(key);
            }
        }
        true
    }

    /// Whether the element at `key` exists and carries `tag`.
    #[must_use]
    pub fn tag_exists(&self, key: &str, tag: &str) -> bool {
        self.elements
            .get(key)
            .is_some_and(|element| element.tag_exists(tag))
    }

    /// Keys whose element carries `tag`. Empty if the tag was never indexed.
    #[must_use]
    pub fn keys_by_tag(&self, tag: &str) -> BTreeSet<String> {
        self.tag_index.get(tag).cloned().unwrap_or_default()
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// A copy of the element at `key`, or `None`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Element> {
        self.elements.get(key).cloned()
    }

    /// A copy of the element at `key`, or the invalid-key sentinel element.
    ///
    /// The sentinel cannot be told apart from a stored element with the
    /// same payload; check [`Store::exists`] first or use [`Store::get`].
    #[must_use]
    pub fn get_element(&self, key: &str) -> Element {
        self.get(key).unwrap_or_else(Element::invalid_key)
    }

    // =========================================================================
    // RENDERING
    // =========================================================================

    /// Render one key with its element, or `"Invalid Key"`.
    #[must_use]
    pub fn render(&self, key: &str) -> String {
        match self.elements.get(key) {
            Some(element) => Self::render_entry(key, element),
            None => INVALID_KEY_RENDER.to_string(),
        }
    }

    /// Render every element, in key order.
    #[must_use]
    pub fn render_all(&self) -> String {
        self.elements
            .iter()
            .map(|(key, element)| Self::render_entry(key, element) + "\n")
            .collect()
    }

    /// Render the given keys, silently skipping those not present.
    #[must_use]
    pub fn render_keys(&self, keys: &BTreeSet<String>) -> String {
        keys.iter()
            .filter_map(|key| {
                self.elements
                    .get(key)
                    .map(|element| Self::render_entry(key, element) + "\n")
            })
            .collect()
    }

    /// Render every element carrying `tag`, or `"N/A"` if the tag was never
    /// indexed.
    #[must_use]
    pub fn render_by_tag(&self, tag: &str) -> String {
        match self.tag_index.get(tag) {
            Some(keys) => self.render_keys(keys),
            None => NOT_AVAILABLE.to_string(),
        }
    }

    fn render_entry(key: &str, element: &Element) -> String {
        format!(" Key : {}\n -----\n{}", key, element.render())
    }

    // =========================================================================
    // INDEX MAINTENANCE
    // =========================================================================

    fn link_tags(&mut self, key: &str, element: &Element) {
        for tag in element.tags() {
            self.tag_index
                .entry(tag.clone())
                .or_default()
                .insert(key.to_string());
        }
    }

    fn unlink_tags(&mut self, key: &str, element: &Element) {
        for tag in element.tags() {
            if let Some(keys) = self.tag_index.get_mut(tag) {
                keys.remove(key);
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
