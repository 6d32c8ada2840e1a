//! Network Module
//!
//! TCP gateway in front of the board.
//!
//! ## Architecture
//! - Single acceptor thread (non-blocking accept, polls the shutdown flag)
//! - Fixed worker pool fed through a crossbeam channel
//! - Commands routed through `Board::execute`

mod server;
mod connection;
mod client;

pub use server::Server;
pub use connection::Connection;
pub use client::Client;
