//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Payload
//! A sequence of fields, each `len (4 bytes) + UTF-8 bytes`. Identifiers are
//! sent as their keys (`TOPIC0`, `POST1`, `COMMENT2`).
//! - CREATE_TOPIC:   name
//! - CREATE_POST:    topic, caption
//! - CREATE_COMMENT: topic, post, author, body
//! - GET_TOPIC / LIST_POSTS:   topic
//! - GET_POST / LIST_COMMENTS: topic, post
//! - GET_COMMENT:    comment
//! - LIST_TOPICS / REBUILD / PING: empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```

use std::io::{Read, Write};
use std::str::FromStr;

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{BoardError, Result};
use super::{Command, CommandType, Response, Status};

/// Header size: 1 byte command/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: cmd_type (1) + payload_len (4) + payload
pub fn encode_command(command: &Command) -> Vec<u8> {
    let mut payload = BytesMut::new();

    match command {
        Command::CreateTopic { name } => put_field(&mut payload, name),
        Command::CreatePost { topic, caption } => {
            put_field(&mut payload, &topic.key());
            put_field(&mut payload, caption);
        }
        Command::CreateComment {
            topic,
            post,
            author,
            body,
        } => {
            put_field(&mut payload, &topic.key());
            put_field(&mut payload, &post.key());
            put_field(&mut payload, author);
            put_field(&mut payload, body);
        }
        Command::GetTopic { topic } | Command::ListPosts { topic } => {
            put_field(&mut payload, &topic.key());
        }
        Command::GetPost { topic, post } | Command::ListComments { topic, post } => {
            put_field(&mut payload, &topic.key());
            put_field(&mut payload, &post.key());
        }
        Command::GetComment { comment } => put_field(&mut payload, &comment.key()),
        Command::ListTopics | Command::Rebuild | Command::Ping => {}
    }

    frame(command.command_type() as u8, &payload)
}

/// Decode a command from bytes
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let (cmd_type, payload) = split_frame(bytes, "command")?;

    let cmd_type = CommandType::from_byte(cmd_type).ok_or_else(|| {
        BoardError::Protocol(format!("Unknown command type: 0x{:02x}", cmd_type))
    })?;

    let mut fields = FieldReader::new(payload, cmd_type);
    let command = match cmd_type {
        CommandType::CreateTopic => Command::CreateTopic {
            name: fields.string("name")?,
        },
        CommandType::CreatePost => Command::CreatePost {
            topic: fields.id("topic")?,
            caption: fields.string("caption")?,
        },
        CommandType::CreateComment => Command::CreateComment {
            topic: fields.id("topic")?,
            post: fields.id("post")?,
            author: fields.string("author")?,
            body: fields.string("body")?,
        },
        CommandType::GetTopic => Command::GetTopic {
            topic: fields.id("topic")?,
        },
        CommandType::GetPost => Command::GetPost {
            topic: fields.id("topic")?,
            post: fields.id("post")?,
        },
        CommandType::GetComment => Command::GetComment {
            comment: fields.id("comment")?,
        },
        CommandType::ListTopics => Command::ListTopics,
        CommandType::ListPosts => Command::ListPosts {
            topic: fields.id("topic")?,
        },
        CommandType::ListComments => Command::ListComments {
            topic: fields.id("topic")?,
            post: fields.id("post")?,
        },
        CommandType::Rebuild => Command::Rebuild,
        CommandType::Ping => Command::Ping,
    };
    fields.finish()?;

    Ok(command)
}

fn put_field(buf: &mut BytesMut, value: &str) {
    buf.put_u32(value.len() as u32);
    buf.put_slice(value.as_bytes());
}

/// Reads length-prefixed fields off a command payload
struct FieldReader<'a> {
    buf: &'a [u8],
    command: CommandType,
}

impl<'a> FieldReader<'a> {
    fn new(buf: &'a [u8], command: CommandType) -> Self {
        Self { buf, command }
    }

    fn string(&mut self, name: &str) -> Result<String> {
        if self.buf.remaining() < 4 {
            return Err(BoardError::Protocol(format!(
                "{:?} command: missing {} length",
                self.command, name
            )));
        }
        let len = self.buf.get_u32() as usize;

        if self.buf.remaining() < len {
            return Err(BoardError::Protocol(format!(
                "{:?} command: incomplete {} (expected {}, got {})",
                self.command,
                name,
                len,
                self.buf.remaining()
            )));
        }
        let value = self.buf[..len].to_vec();
        self.buf.advance(len);

        String::from_utf8(value).map_err(|e| {
            BoardError::Protocol(format!("{:?} command: {} is not UTF-8: {}", self.command, name, e))
        })
    }

    fn id<T: FromStr<Err = BoardError>>(&mut self, name: &str) -> Result<T> {
        self.string(name)?.parse()
    }

    fn finish(self) -> Result<()> {
        if self.buf.has_remaining() {
            return Err(BoardError::Protocol(format!(
                "{:?} command: unexpected {} trailing bytes",
                self.command,
                self.buf.remaining()
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
pub fn encode_response(response: &Response) -> Vec<u8> {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    frame(response.status as u8, payload)
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (status_byte, payload) = split_frame(bytes, "response")?;

    let status = match status_byte {
        0x00 => Status::Ok,
        0x01 => Status::NotFound,
        0x02 => Status::Error,
        _ => {
            return Err(BoardError::Protocol(format!(
                "Unknown response status: 0x{:02x}",
                status_byte
            )))
        }
    };

    let payload = if payload.is_empty() {
        None
    } else {
        Some(payload.to_vec())
    };

    Ok(Response { status, payload })
}

// =============================================================================
// Framing
// =============================================================================

fn frame(tag: u8, payload: &[u8]) -> Vec<u8> {
    let mut message = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    message.put_u8(tag);
    message.put_u32(payload.len() as u32);
    message.put_slice(payload);
    message.to_vec()
}

/// Validate a frame header and split off its payload
fn split_frame<'a>(bytes: &'a [u8], what: &str) -> Result<(u8, &'a [u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(BoardError::Protocol(format!(
            "Incomplete {} header: expected {} bytes, got {}",
            what,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let tag = bytes[0];
    let payload_len = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]) as usize;

    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(BoardError::Protocol(format!(
            "{} payload too large: {} bytes (max {})",
            what, payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(BoardError::Protocol(format!(
            "Incomplete {} payload: expected {} bytes, got {}",
            what,
            total_len,
            bytes.len()
        )));
    }

    Ok((tag, &bytes[HEADER_SIZE..total_len]))
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one complete frame (header + payload) from a stream
///
/// An error other than I/O means the header was unusable and the payload
/// was left unread, so the stream is no longer aligned on a frame.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let payload_len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]) as usize;
    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(BoardError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let mut message = vec![0u8; HEADER_SIZE + payload_len];
    message[..HEADER_SIZE].copy_from_slice(&header);
    if payload_len > 0 {
        reader.read_exact(&mut message[HEADER_SIZE..])?;
    }
    Ok(message)
}

/// Read a complete command from a stream
///
/// Blocks until a complete command is received or an error occurs
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    decode_command(&read_frame(reader)?)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    writer.write_all(&encode_command(command))?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    decode_response(&read_frame(reader)?)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    writer.write_all(&encode_response(response))?;
    writer.flush()?;
    Ok(())
}
