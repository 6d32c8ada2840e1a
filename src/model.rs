//! Board records
//!
//! Two layers of types live here:
//! - `*Record`: the JSON shape stored as a ledger value
//! - `Topic` / `Post` / `Comment`: the materialized views handed to callers
//!
//! Ledger values are field-named JSON, so readers ignore fields they do not
//! know and accept the legacy field names written by older clients.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ids::{CommentId, PostId, TopicId};

// =============================================================================
// Ledger Values
// =============================================================================

/// Stored value of a topic (`TOPIC<n>`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRecord {
    #[serde(rename = "topicName", alias = "TopicName", alias = "name")]
    pub name: String,
}

/// Stored value of a post (`TOPIC<n>POST<m>`)
///
/// The owning topic is also recoverable from the key; the key wins when the
/// two disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    #[serde(alias = "Caption")]
    pub caption: String,

    #[serde(
        rename = "topicID",
        alias = "TopicID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub topic: Option<TopicId>,
}

/// Stored value of a comment (`COMMENT<k>`)
///
/// Carries its parents, since the comment key itself is not scoped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    #[serde(alias = "user", alias = "User")]
    pub author: String,

    #[serde(alias = "text", alias = "Text")]
    pub body: String,

    #[serde(rename = "parentTopic", alias = "topicID", alias = "TopicID")]
    pub parent_topic: TopicId,

    #[serde(rename = "parentPost", alias = "postID", alias = "PostID")]
    pub parent_post: PostId,
}

macro_rules! json_value {
    ($ty:ty) => {
        impl $ty {
            /// Encode as a ledger value
            pub fn to_bytes(&self) -> Result<Vec<u8>> {
                Ok(serde_json::to_vec(self)?)
            }

            /// Decode a ledger value
            pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
                Ok(serde_json::from_slice(bytes)?)
            }
        }
    };
}

json_value!(TopicRecord);
json_value!(PostRecord);
json_value!(CommentRecord);

// =============================================================================
// Materialized Views
// =============================================================================

/// A topic with its posts in ascending id order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: TopicId,
    pub name: String,
    pub posts: Vec<Post>,
}

/// A post with its comment references in ascending id order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub caption: String,
    pub parent_topic: TopicId,
    pub comments: Vec<CommentId>,
}

/// A comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub author: String,
    pub body: String,
    pub parent_topic: TopicId,
    pub parent_post: PostId,
}

impl Comment {
    /// Attach an id to a decoded ledger value
    pub fn from_record(id: CommentId, record: CommentRecord) -> Self {
        Self {
            id,
            author: record.author,
            body: record.body,
            parent_topic: record.parent_topic,
            parent_post: record.parent_post,
        }
    }
}
