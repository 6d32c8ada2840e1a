//! Response definitions
//!
//! Represents responses to gateway clients.

use crate::error::BoardError;

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    Error = 0x02,
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (JSON body for OK, message for NOT_FOUND / ERROR)
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Create an OK response with optional payload
    pub fn ok(payload: Option<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// Create a NOT_FOUND response naming what was missing
    pub fn not_found(what: &str) -> Self {
        Self {
            status: Status::NotFound,
            payload: Some(what.as_bytes().to_vec()),
        }
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self {
            status: Status::Error,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Map a board result onto the wire
    pub fn from_result(result: Result<Vec<u8>, BoardError>) -> Self {
        match result {
            Ok(body) => Response::ok(Some(body)),
            Err(BoardError::NotFound(what)) => Response::not_found(&what),
            Err(e) => Response::error(&e.to_string()),
        }
    }

    /// Payload as text, for messages
    pub fn payload_text(&self) -> String {
        self.payload
            .as_deref()
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .unwrap_or_default()
    }
}
