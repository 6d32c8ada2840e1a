//! Tests for MemoryStore
//!
//! These tests verify:
//! - Point reads and writes
//! - Conditional writes
//! - High-water counters per key family
//! - Prefix scans

use std::sync::Arc;
use std::thread;

use ledgerboard::{MemoryStore, Store, TopicId};

// =============================================================================
// Basic Operations
// =============================================================================

#[test]
fn test_get_absent_key_is_none() {
    let store = MemoryStore::new();
    assert_eq!(store.get("TOPIC0").unwrap(), None);
    assert!(store.is_empty());
}

#[test]
fn test_put_overwrites() {
    let store = MemoryStore::new();
    store.put("TOPIC0", b"first").unwrap();
    store.put("TOPIC0", b"second").unwrap();

    assert_eq!(store.get("TOPIC0").unwrap(), Some(b"second".to_vec()));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_put_if_absent_concurrent_single_winner() {
    let store = Arc::new(MemoryStore::new());
    let mut handles = vec![];

    for i in 0..8 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            store
                .put_if_absent("COMMENT0", format!("writer{}", i).as_bytes())
                .unwrap()
        }));
    }

    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|won| *won)
        .count();
    assert_eq!(winners, 1);
}

// =============================================================================
// Counters
// =============================================================================

#[test]
fn test_counters_start_at_zero() {
    let store = MemoryStore::new();
    assert_eq!(store.topic_count().unwrap(), 0);
    assert_eq!(store.post_count(TopicId(0)).unwrap(), 0);
    assert_eq!(store.comment_count().unwrap(), 0);
}

#[test]
fn test_counters_track_highest_sequence() {
    let store = MemoryStore::new();
    store.put("TOPIC0", b"a").unwrap();
    store.put("TOPIC3", b"b").unwrap();
    store.put("TOPIC1", b"c").unwrap();

    assert_eq!(store.topic_count().unwrap(), 4);
}

#[test]
fn test_post_counters_are_per_topic() {
    let store = MemoryStore::new();
    store.put("TOPIC0POST0", b"a").unwrap();
    store.put("TOPIC0POST1", b"b").unwrap();
    store.put("TOPIC1POST0", b"c").unwrap();

    assert_eq!(store.post_count(TopicId(0)).unwrap(), 2);
    assert_eq!(store.post_count(TopicId(1)).unwrap(), 1);
    assert_eq!(store.post_count(TopicId(2)).unwrap(), 0);
    // Post keys do not move the topic counter
    assert_eq!(store.topic_count().unwrap(), 0);
}

#[test]
fn test_foreign_keys_do_not_move_counters() {
    let store = MemoryStore::new();
    store.put("COMMENTS", b"x").unwrap();
    store.put("TOPIC01", b"x").unwrap();
    store.put("settings", b"x").unwrap();

    assert_eq!(store.topic_count().unwrap(), 0);
    assert_eq!(store.comment_count().unwrap(), 0);
    assert_eq!(store.len(), 3);
}

#[test]
fn test_remove_leaves_gap() {
    let store = MemoryStore::new();
    for i in 0..3 {
        store.put(&format!("TOPIC{}", i), b"t").unwrap();
    }

    assert_eq!(store.remove("TOPIC1"), Some(b"t".to_vec()));
    assert_eq!(store.remove("TOPIC1"), None);
    assert_eq!(store.topic_count().unwrap(), 3);
    assert!(!store.contains_key("TOPIC1"));
}

// =============================================================================
// Scans
// =============================================================================

#[test]
fn test_scan_prefix_matches_only_prefix() {
    let store = MemoryStore::new();
    store.put("TOPIC0", b"t").unwrap();
    store.put("TOPIC0POST0", b"p").unwrap();
    store.put("COMMENT0", b"c").unwrap();

    let keys: Vec<String> = store
        .scan_prefix("TOPIC0")
        .unwrap()
        .into_iter()
        .map(|(k, _)| k)
        .collect();
    assert_eq!(keys, vec!["TOPIC0", "TOPIC0POST0"]);

    assert!(store.scan_prefix("POST").unwrap().is_empty());
}

#[test]
fn test_entries_snapshot_in_key_order() {
    let store = MemoryStore::new();
    store.put("b", b"2").unwrap();
    store.put("a", b"1").unwrap();

    let entries = store.entries();
    assert_eq!(entries[0], ("a".to_string(), b"1".to_vec()));
    assert_eq!(entries[1], ("b".to_string(), b"2".to_vec()));
}
