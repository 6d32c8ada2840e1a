//! Command definitions
//!
//! Represents requests from gateway clients.

use crate::ids::{CommentId, PostId, TopicId};

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    CreateTopic = 0x01,
    CreatePost = 0x02,
    CreateComment = 0x03,
    GetTopic = 0x04,
    GetPost = 0x05,
    GetComment = 0x06,
    ListTopics = 0x07,
    ListPosts = 0x08,
    ListComments = 0x09,
    Rebuild = 0x0a,
    Ping = 0x0b,
}

impl CommandType {
    pub fn from_byte(byte: u8) -> Option<Self> {
        let ty = match byte {
            0x01 => CommandType::CreateTopic,
            0x02 => CommandType::CreatePost,
            0x03 => CommandType::CreateComment,
            0x04 => CommandType::GetTopic,
            0x05 => CommandType::GetPost,
            0x06 => CommandType::GetComment,
            0x07 => CommandType::ListTopics,
            0x08 => CommandType::ListPosts,
            0x09 => CommandType::ListComments,
            0x0a => CommandType::Rebuild,
            0x0b => CommandType::Ping,
            _ => return None,
        };
        Some(ty)
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a topic
    CreateTopic { name: String },

    /// Create a post under a topic
    CreatePost { topic: TopicId, caption: String },

    /// Create a comment on a post
    CreateComment {
        topic: TopicId,
        post: PostId,
        author: String,
        body: String,
    },

    GetTopic { topic: TopicId },

    GetPost { topic: TopicId, post: PostId },

    GetComment { comment: CommentId },

    ListTopics,

    ListPosts { topic: TopicId },

    ListComments { topic: TopicId, post: PostId },

    /// Rebuild the index from the ledger
    Rebuild,

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::CreateTopic { .. } => CommandType::CreateTopic,
            Command::CreatePost { .. } => CommandType::CreatePost,
            Command::CreateComment { .. } => CommandType::CreateComment,
            Command::GetTopic { .. } => CommandType::GetTopic,
            Command::GetPost { .. } => CommandType::GetPost,
            Command::GetComment { .. } => CommandType::GetComment,
            Command::ListTopics => CommandType::ListTopics,
            Command::ListPosts { .. } => CommandType::ListPosts,
            Command::ListComments { .. } => CommandType::ListComments,
            Command::Rebuild => CommandType::Rebuild,
            Command::Ping => CommandType::Ping,
        }
    }
}
