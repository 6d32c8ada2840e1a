//! Ledger Log Module
//!
//! Append-only file format behind [`super::LogStore`].
//!
//! ## Responsibilities
//! - Append one entry per ledger write
//! - CRC32 checksums for corruption detection
//! - Log Sequence Numbers (LSN) for ordering
//! - Replay on open, cutting off torn or corrupt tails
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Entry 1                                 │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ LSN (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! ├─────────────────────────────────────────┤
//! │ Entry 2                                 │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ LSN (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! └─────────────────────────────────────────┘
//! ```
//! Data is `bincode((timestamp, op))`; the CRC covers LSN and data.

mod entry;
mod writer;
mod recovery;

pub use entry::{LogEntry, LogOp, HEADER_SIZE, MAX_ENTRY_SIZE};
pub use writer::LogWriter;
pub use recovery::{LogRecovery, RecoveryResult};
