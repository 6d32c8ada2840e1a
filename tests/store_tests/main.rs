//! Store Tests
//!
//! - `memory_tests`: the in-memory ledger and its counters
//! - `log_store_tests`: the durable ledger across reopen
//! - `recovery_tests`: log replay with torn or corrupt tails

mod memory_tests;
mod recovery_tests;
