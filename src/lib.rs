//! Personal finance ledger.
//!
//! [`LedgerStore`](operations::ledger::LedgerStore) owns the transaction
//! collection and persists it through a [`KeyValueStore`](db::KeyValueStore);
//! [`operations::views`] derives summaries from snapshots of it.

pub mod cli;
pub mod db;
pub mod error;
pub mod models;
pub mod operations;

#[cfg(test)]
mod test_utils;

pub use error::{Error, Result};
