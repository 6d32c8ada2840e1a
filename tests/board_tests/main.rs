//! Board Tests
//!
//! - `mutation_tests`: id allocation and write-through
//! - `rebuild_tests`: reconstructing the index from the ledger
//! - `concurrency_tests`: parallel writers and rebuilds
//! - `failure_tests`: store failures and allocation conflicts

mod support;

mod concurrency_tests;
