//! Gateway Client
//!
//! Blocking client for the board server, used by the CLI.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use serde::de::DeserializeOwned;

use crate::error::{BoardError, Result};
use crate::ids::{CommentId, PostId, TopicId};
use crate::model::{Comment, Post, Topic};
use crate::protocol::{read_response, write_command, Command, Response, Status};

/// A connection to a board server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        Ok(Self {
            reader: BufReader::new(stream.try_clone()?),
            writer: BufWriter::new(stream),
        })
    }

    /// Send a command and wait for the raw response
    pub fn send(&mut self, command: &Command) -> Result<Response> {
        write_command(&mut self.writer, command)?;
        read_response(&mut self.reader)
    }

    /// Send a command and decode an OK payload as JSON
    ///
    /// NOT_FOUND becomes `BoardError::NotFound`; ERROR becomes `Protocol`.
    pub fn request<T: DeserializeOwned>(&mut self, command: &Command) -> Result<T> {
        let response = self.send(command)?;
        match response.status {
            Status::Ok => {
                let payload = response.payload.unwrap_or_default();
                Ok(serde_json::from_slice(&payload)?)
            }
            Status::NotFound => Err(BoardError::NotFound(response.payload_text())),
            Status::Error => Err(BoardError::Protocol(response.payload_text())),
        }
    }

    pub fn ping(&mut self) -> Result<()> {
        let response = self.send(&Command::Ping)?;
        match response.status {
            Status::Ok => Ok(()),
            _ => Err(BoardError::Protocol(response.payload_text())),
        }
    }

    pub fn create_topic(&mut self, name: &str) -> Result<TopicId> {
        self.request(&Command::CreateTopic {
            name: name.to_string(),
        })
    }

    pub fn create_post(&mut self, topic: TopicId, caption: &str) -> Result<PostId> {
        self.request(&Command::CreatePost {
            topic,
            caption: caption.to_string(),
        })
    }

    pub fn create_comment(
        &mut self,
        topic: TopicId,
        post: PostId,
        author: &str,
        body: &str,
    ) -> Result<CommentId> {
        self.request(&Command::CreateComment {
            topic,
            post,
            author: author.to_string(),
            body: body.to_string(),
        })
    }

    pub fn list_topics(&mut self) -> Result<Vec<Topic>> {
        self.request(&Command::ListTopics)
    }

    pub fn list_posts(&mut self, topic: TopicId) -> Result<Vec<Post>> {
        self.request(&Command::ListPosts { topic })
    }

    pub fn list_comments(&mut self, topic: TopicId, post: PostId) -> Result<Vec<Comment>> {
        self.request(&Command::ListComments { topic, post })
    }

    pub fn get_comment(&mut self, comment: CommentId) -> Result<Comment> {
        self.request(&Command::GetComment { comment })
    }
}
