//! Database operations for the transaction ledger.

use std::str::FromStr;

use rusqlite::{Connection, Row, types::Type};
use time::OffsetDateTime;

use crate::{
    Error,
    member::MemberId,
    transaction::{HistoryEntry, Transaction, TransactionKind},
};

/// Append an entry to the ledger and return it with its generated ID.
///
/// The caller is responsible for running this inside the same SQL transaction
/// as the balance mutation it records.
pub fn append_ledger_entry(
    member_id: MemberId,
    kind: TransactionKind,
    amount: i64,
    timestamp: OffsetDateTime,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection.execute(
        "INSERT INTO ledger (member_id, kind, amount, timestamp) VALUES (?1, ?2, ?3, ?4);",
        (member_id, kind.as_str(), amount, timestamp),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Transaction {
        id,
        member_id,
        kind,
        amount,
        timestamp,
    })
}

/// Retrieve a member's ledger entries ordered oldest first.
pub fn get_ledger_for_member(
    member_id: MemberId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, member_id, kind, amount, timestamp FROM ledger
            WHERE member_id = :member_id
            ORDER BY timestamp ASC, id ASC;",
        )?
        .query_map(&[(":member_id", &member_id)], map_ledger_row)?
        .map(|maybe_entry| maybe_entry.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the global history feed, newest first, joined with each entry's
/// member name and tag.
///
/// When `limit` is given the feed is truncated to the newest `limit` entries;
/// otherwise the full ledger is returned.
pub fn get_recent_ledger_entries(
    limit: Option<u32>,
    connection: &Connection,
) -> Result<Vec<HistoryEntry>, Error> {
    // SQLite treats a negative LIMIT as unbounded.
    let limit = limit.map(i64::from).unwrap_or(-1);

    connection
        .prepare(
            "SELECT l.timestamp, l.kind, l.amount, m.name, m.tag FROM ledger l
            INNER JOIN member m ON m.id = l.member_id
            ORDER BY l.timestamp DESC, l.id DESC
            LIMIT :limit;",
        )?
        .query_map(&[(":limit", &limit)], map_history_row)?
        .map(|maybe_entry| maybe_entry.map_err(|error| error.into()))
        .collect()
}

/// Initialize the ledger table and indexes.
pub fn create_ledger_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS ledger (
            id INTEGER PRIMARY KEY,
            member_id INTEGER NOT NULL REFERENCES member(id),
            kind TEXT NOT NULL,
            amount INTEGER NOT NULL CHECK (amount > 0),
            timestamp TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_ledger_member_id ON ledger(member_id);",
    )?;

    Ok(())
}

fn map_kind(raw: &str, column: usize) -> Result<TransactionKind, rusqlite::Error> {
    TransactionKind::from_str(raw).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            Type::Text,
            format!("unknown transaction kind {raw:?}").into(),
        )
    })
}

fn map_ledger_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_kind: String = row.get(2)?;

    Ok(Transaction {
        id: row.get(0)?,
        member_id: row.get(1)?,
        kind: map_kind(&raw_kind, 2)?,
        amount: row.get(3)?,
        timestamp: row.get(4)?,
    })
}

fn map_history_row(row: &Row) -> Result<HistoryEntry, rusqlite::Error> {
    let raw_kind: String = row.get(1)?;

    Ok(HistoryEntry {
        timestamp: row.get(0)?,
        kind: map_kind(&raw_kind, 1)?,
        amount: row.get(2)?,
        name: row.get(3)?,
        tag: row.get(4)?,
    })
}
