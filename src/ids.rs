//! Identifier Codec
//!
//! Maps typed sequence numbers to their external ledger keys and back.
//!
//! ## Key Layout
//! ```text
//! Topic    TOPIC<n>            e.g. TOPIC3
//! Post     TOPIC<n>POST<m>     e.g. TOPIC3POST7   (scoped under its topic)
//! Comment  COMMENT<k>          e.g. COMMENT42     (flat, global)
//! ```
//!
//! Posts are namespaced by key, so the owning topic of a post is read off
//! the key. Comments are not: their parents live inside the stored value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BoardError, Result};

/// The three families of sequence-numbered entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Topic,
    Post,
    Comment,
}

impl EntityKind {
    /// Fixed key prefix for this kind
    pub const fn prefix(self) -> &'static str {
        match self {
            EntityKind::Topic => "TOPIC",
            EntityKind::Post => "POST",
            EntityKind::Comment => "COMMENT",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Topic => write!(f, "topic"),
            EntityKind::Post => write!(f, "post"),
            EntityKind::Comment => write!(f, "comment"),
        }
    }
}

/// Render a sequence number as a key of the given kind
pub fn encode(kind: EntityKind, n: u64) -> String {
    format!("{}{}", kind.prefix(), n)
}

/// Parse a key of the given kind back into its sequence number
///
/// The remainder after the prefix must be a canonical decimal: no sign,
/// no leading zeros (except `0` itself), and it must fit in a `u64`.
pub fn decode(kind: EntityKind, key: &str) -> Result<u64> {
    let digits = key.strip_prefix(kind.prefix()).ok_or_else(|| {
        BoardError::MalformedKey(format!("{:?} does not start with {}", key, kind.prefix()))
    })?;
    parse_sequence(digits, key)
}

fn parse_sequence(digits: &str, key: &str) -> Result<u64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BoardError::MalformedKey(format!(
            "{:?} has no valid sequence number",
            key
        )));
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return Err(BoardError::MalformedKey(format!(
            "{:?} has a leading zero",
            key
        )));
    }
    digits
        .parse::<u64>()
        .map_err(|e| BoardError::MalformedKey(format!("{:?}: {}", key, e)))
}

// =============================================================================
// Typed Identifiers
// =============================================================================

macro_rules! sequence_id {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(into = "String", try_from = "String")]
        pub struct $name(pub u64);

        impl $name {
            pub const KIND: EntityKind = $kind;

            /// The raw sequence number
            pub fn seq(self) -> u64 {
                self.0
            }

            /// The external key (`Display` renders the same string)
            pub fn key(self) -> String {
                encode(Self::KIND, self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", Self::KIND.prefix(), self.0)
            }
        }

        impl FromStr for $name {
            type Err = BoardError;

            fn from_str(s: &str) -> Result<Self> {
                decode(Self::KIND, s).map($name)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.to_string()
            }
        }

        impl TryFrom<String> for $name {
            type Error = BoardError;

            fn try_from(s: String) -> Result<Self> {
                s.parse()
            }
        }
    };
}

sequence_id!(
    /// Topic identifier, rendered `TOPIC<n>`
    TopicId,
    EntityKind::Topic
);

sequence_id!(
    /// Post identifier scoped within its topic, rendered `POST<m>`
    PostId,
    EntityKind::Post
);

sequence_id!(
    /// Globally sequenced comment identifier, rendered `COMMENT<k>`
    CommentId,
    EntityKind::Comment
);

// =============================================================================
// Composite Keys
// =============================================================================

/// Ledger key of a post: its topic key followed by its own `POST<m>` suffix
pub fn post_key(topic: TopicId, post: PostId) -> String {
    format!("{}{}", topic, post)
}

/// Split a composite post key into its topic and post identifiers
pub fn decode_post_key(key: &str) -> Result<(TopicId, PostId)> {
    let rest = key.strip_prefix(EntityKind::Topic.prefix()).ok_or_else(|| {
        BoardError::MalformedKey(format!("{:?} is not a post key", key))
    })?;
    let split = rest
        .find(EntityKind::Post.prefix())
        .ok_or_else(|| BoardError::MalformedKey(format!("{:?} is not a post key", key)))?;

    let topic = parse_sequence(&rest[..split], key)?;
    let post = parse_sequence(&rest[split + EntityKind::Post.prefix().len()..], key)?;
    Ok((TopicId(topic), PostId(post)))
}

/// The entity family a ledger key belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFamily {
    Topic(TopicId),
    Post(TopicId, PostId),
    Comment(CommentId),
}

impl KeyFamily {
    /// Classify a ledger key; `None` for keys outside the three families
    ///
    /// `TOPIC` is a prefix of every post key, so post keys are tried first.
    pub fn classify(key: &str) -> Option<KeyFamily> {
        if let Ok((topic, post)) = decode_post_key(key) {
            return Some(KeyFamily::Post(topic, post));
        }
        if let Ok(topic) = key.parse::<TopicId>() {
            return Some(KeyFamily::Topic(topic));
        }
        key.parse::<CommentId>().ok().map(KeyFamily::Comment)
    }

    /// Which kind of entity this key names
    pub fn kind(&self) -> EntityKind {
        match self {
            KeyFamily::Topic(_) => EntityKind::Topic,
            KeyFamily::Post(..) => EntityKind::Post,
            KeyFamily::Comment(_) => EntityKind::Comment,
        }
    }
}
