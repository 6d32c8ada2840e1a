//! Identifier Codec Tests
//!
//! These tests verify:
//! - Key rendering for each entity kind
//! - Rejection of malformed keys
//! - Composite post keys and key family classification
//! - Serde representation of typed ids

use ledgerboard::ids::{decode, decode_post_key, encode, post_key, EntityKind, KeyFamily};
use ledgerboard::{BoardError, CommentId, PostId, TopicId};

// =============================================================================
// Encoding
// =============================================================================

#[test]
fn test_typed_ids_display_as_keys() {
    assert_eq!(TopicId(0).to_string(), "TOPIC0");
    assert_eq!(PostId(15).to_string(), "POST15");
    assert_eq!(CommentId(1024).to_string(), "COMMENT1024");
    assert_eq!(TopicId(4).key(), encode(EntityKind::Topic, 4));
}

#[test]
fn test_decode_reads_back_large_sequence() {
    let key = encode(EntityKind::Comment, u64::MAX);
    assert_eq!(decode(EntityKind::Comment, &key).unwrap(), u64::MAX);
}

// =============================================================================
// Malformed Keys
// =============================================================================

#[test]
fn test_decode_malformed_keys() {
    let cases = [
        (EntityKind::Topic, "TOPIC"),
        (EntityKind::Topic, "TOPICabc"),
        (EntityKind::Topic, "TOPIC 1"),
        (EntityKind::Topic, "TOPIC007"),
        (EntityKind::Topic, "topic1"),
        (EntityKind::Post, "POST-3"),
        (EntityKind::Comment, "COMMENT18446744073709551616"),
        (EntityKind::Comment, "TOPIC1"),
    ];

    for (kind, key) in cases {
        assert!(
            matches!(decode(kind, key), Err(BoardError::MalformedKey(_))),
            "{:?} should not decode as {:?}",
            key,
            kind
        );
    }
}

#[test]
fn test_parse_typed_id_rejects_other_kind() {
    assert!("POST0".parse::<TopicId>().is_err());
    assert!("TOPIC0".parse::<CommentId>().is_err());
    assert_eq!("POST3".parse::<PostId>().unwrap(), PostId(3));
}

// =============================================================================
// Composite Keys
// =============================================================================

#[test]
fn test_post_key_is_topic_key_plus_post_suffix() {
    let topic = TopicId(12);
    let post = PostId(0);
    assert_eq!(post_key(topic, post), format!("{}{}", topic.key(), post.key()));
}

#[test]
fn test_decode_post_key_rejects_incomplete_keys() {
    assert!(decode_post_key("TOPIC1").is_err());
    assert!(decode_post_key("TOPIC1POST").is_err());
    assert!(decode_post_key("TOPICPOST1").is_err());
    assert!(decode_post_key("TOPIC1POST2POST3").is_err());
    assert!(decode_post_key("COMMENT1").is_err());
}

#[test]
fn test_key_family_kind() {
    assert_eq!(
        KeyFamily::classify("TOPIC10POST2").map(|f| f.kind()),
        Some(EntityKind::Post)
    );
    assert_eq!(
        KeyFamily::classify("TOPIC10").map(|f| f.kind()),
        Some(EntityKind::Topic)
    );
    assert_eq!(KeyFamily::classify("COMMENTS"), None);
}

// =============================================================================
// Serde
// =============================================================================

#[test]
fn test_ids_serialize_as_key_strings() {
    assert_eq!(serde_json::to_string(&TopicId(2)).unwrap(), "\"TOPIC2\"");
    assert_eq!(
        serde_json::from_str::<CommentId>("\"COMMENT9\"").unwrap(),
        CommentId(9)
    );
    assert!(serde_json::from_str::<PostId>("\"POST09\"").is_err());
}
