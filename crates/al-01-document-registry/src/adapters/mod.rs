//! # Adapters Module
//!
//! - `storage`: Ordered key-value stores (in-memory, file-backed)
//! - `ledger`: Single-node ledger host providing `TransactionContext`
//! - `time`: Transaction timestamp sources

pub mod ledger;
pub mod storage;
pub mod time;
