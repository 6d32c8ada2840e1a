//! Protocol Module
//!
//! Defines the gateway wire protocol between clients and the board server.
//!
//! ## Protocol Format (V1 - Simple Binary)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: CREATE_TOPIC    0x07: LIST_TOPICS
//! - 0x02: CREATE_POST     0x08: LIST_POSTS
//! - 0x03: CREATE_COMMENT  0x09: LIST_COMMENTS
//! - 0x04: GET_TOPIC       0x0a: REBUILD
//! - 0x05: GET_POST        0x0b: PING
//! - 0x06: GET_COMMENT
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK (JSON payload)
//! - 0x01: NOT_FOUND
//! - 0x02: ERROR

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{Response, Status};
pub use codec::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_frame, read_response, write_command, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
