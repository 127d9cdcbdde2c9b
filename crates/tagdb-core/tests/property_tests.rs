//! # Property-Based Tests
//!
//! Index consistency and idempotence of the store under random operation
//! sequences, plus tokenizer round trips.

use proptest::collection::{btree_set, vec};
use proptest::prelude::*;
use std::collections::BTreeSet;
use tagdb_core::{Element, Flag, NoopTrace, Store, tokenize};

// =============================================================================
// STRATEGIES
// =============================================================================

#[derive(Debug, Clone)]
enum Op {
    Insert(String, BTreeSet<String>),
    Update(String, BTreeSet<String>),
    Remove(String),
    UpdatePayload(String, String),
    AddTag(String, String),
    RemoveTag(String, String),
}

fn key() -> impl Strategy<Value = String> {
    (0u8..6).prop_map(|i| format!("key{i}"))
}

fn tag() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["Data", "Sith", "Machine", "AI", "Terminator"])
        .prop_map(str::to_string)
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (key(), btree_set(tag(), 0..4)).prop_map(|(k, t)| Op::Insert(k, t)),
        (key(), btree_set(tag(), 0..4)).prop_map(|(k, t)| Op::Update(k, t)),
        key().prop_map(Op::Remove),
        (key(), "[a-z]{1,8}").prop_map(|(k, v)| Op::UpdatePayload(k, v)),
        (key(), tag()).prop_map(|(k, t)| Op::AddTag(k, t)),
        (key(), tag()).prop_map(|(k, t)| Op::RemoveTag(k, t)),
    ]
}

fn apply(store: &mut Store, op: &Op) {
    match op {
        Op::Insert(k, tags) => {
            store.insert(k.clone(), Element::with_tags("v", tags.iter().cloned()));
        }
        Op::Update(k, tags) => {
            store.update(k, Element::with_tags("v", tags.iter().cloned()));
        }
        Op::Remove(k) => {
            store.remove(k);
        }
        Op::UpdatePayload(k, v) => {
            store.update_payload(k, v.clone());
        }
        Op::AddTag(k, t) => {
            store.add_tag(k, t);
        }
        Op::RemoveTag(k, t) => {
            store.remove_tag(k, t);
        }
    }
}

/// Every element tag is indexed and every index entry is backed by a tag.
fn index_is_consistent(store: &Store) -> bool {
    let forward = store.keys().all(|k| {
        store
            .get_element(k)
            .tags()
            .iter()
            .all(|t| store.keys_by_tag(t).contains(k))
    });
    let backward = store
        .indexed_tags()
        .all(|t| store.keys_by_tag(t).iter().all(|k| store.tag_exists(k, t)));
    forward && backward
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// The tag index matches element tag sets after every step.
    #[test]
    fn index_consistent_after_every_step(ops in vec(op(), 1..60)) {
        let mut store = Store::default();
        for op in &ops {
            apply(&mut store, op);
            prop_assert!(index_is_consistent(&store), "inconsistent after {:?}", op);
        }
    }

    /// Tagging twice succeeds twice and leaves a single entry.
    #[test]
    fn add_tag_idempotent(k in key(), t in tag()) {
        let mut store = Store::default();
        store.insert(k.clone(), Element::new("v"));

        prop_assert!(store.add_tag(&k, &t));
        prop_assert!(store.add_tag(&k, &t));
        prop_assert_eq!(store.get_element(&k).tag_count(), 1);
        prop_assert_eq!(store.keys_by_tag(&t).len(), 1);
    }

    /// Insert then read returns the same payload and tags, stamped no
    /// earlier than the insertion.
    #[test]
    fn insert_get_round_trip(
        k in key(),
        payload in "[A-Za-z0-9 ]{0,32}",
        tags in btree_set(tag(), 0..5),
    ) {
        let element = Element::with_tags(payload.clone(), tags.iter().cloned());
        let floor = element.last_modified();

        let mut store = Store::default();
        prop_assert!(store.insert(k.clone(), element));

        let read = store.get(&k).expect("present");
        prop_assert_eq!(read.payload(), payload.as_str());
        prop_assert_eq!(read.tags(), &tags);
        prop_assert!(read.last_modified() >= floor);
    }

    /// A value without markers survives tokenizing, trimmed.
    #[test]
    fn tokenizer_preserves_plain_values(
        key_text in "[A-Za-z0-9_]{1,16}",
        value_text in "[A-Za-z0-9_ ]{0,24}[A-Za-z0-9_]",
        trailing in " {0,3}",
    ) {
        let input = format!("-t INSERT -k {key_text} -v {value_text}{trailing}");
        let params = tokenize(&input, &NoopTrace);

        prop_assert_eq!(params.get(Flag::Key), Some(key_text.as_str()));
        prop_assert_eq!(params.get(Flag::Value), Some(value_text.trim()));
    }
}
