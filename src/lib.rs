//! # LedgerBoard
//!
//! A topic → post → comment board whose records of truth live in a flat,
//! append-mostly key-value ledger:
//! - Sequence-based identifiers (`TOPIC<n>`, `TOPIC<n>POST<m>`, `COMMENT<k>`)
//! - In-memory hierarchical index mirroring the ledger
//! - Full index rebuild from the ledger alone after restart
//! - Per-scope allocation locks so concurrent writers never share an id
//! - TCP gateway and CLI client
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Gateway                             │
//! │                  (Worker Thread Pool)                        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Board                                 │
//! │     (Scope Locks: topics / posts-per-topic / comments)       │
//! └──────┬───────────────────┬───────────────────────┬──────────┘
//!        │ allocate          │ persist               │ append
//!        ▼                   ▼                       ▼
//!   ┌──────────┐      ┌─────────────┐        ┌──────────────┐
//!   │   ids    │      │    Store    │◄───────│   Rebuild    │
//!   │ (codec)  │      │  (ledger)   │ reads  │              │
//!   └──────────┘      └─────────────┘        └──────┬───────┘
//!                                                   │ populate
//!                                            ┌──────▼───────┐
//!                                            │ Hierarchical │
//!                                            │    Index     │
//!                                            └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod ids;
pub mod model;
pub mod store;
pub mod index;
pub mod rebuild;
pub mod board;
pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{BoardError, Result, StoreError, StoreResult};
pub use config::Config;
pub use ids::{CommentId, EntityKind, PostId, TopicId};
pub use model::{Comment, Post, Topic};
pub use store::{LogStore, MemoryStore, Store};
pub use index::HierarchicalIndex;
pub use rebuild::RebuildReport;
pub use board::Board;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of LedgerBoard
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
