//! The transaction processor.
//!
//! A transaction moves money into or out of a member's balance. Every
//! transaction is born committed: it is validated, applied to the balance, and
//! appended to the ledger in one atomic step, and is never updated or deleted
//! afterwards. This module contains:
//! - The `Transaction` model and `TransactionKind`
//! - Database functions for appending to and reading the ledger
//! - The apply and history endpoints

mod apply;
mod db;
mod domain;
mod history;

pub use apply::{apply_transaction, apply_transaction_endpoint};
pub use db::{append_ledger_entry, create_ledger_table, get_ledger_for_member};
pub use domain::{HistoryEntry, Transaction, TransactionId, TransactionKind};
pub use history::get_history_endpoint;
